/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::thread::{self, JoinHandle};

use thiserror::Error;

/// Why the result of a [`BackgroundTask`] could not be read.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TaskError {
    /// The computation is still running. Poll [`BackgroundTask::is_done`] first.
    #[error("task has not finished yet")]
    NotFinished,

    /// The result was already read once.
    #[error("task result was already taken")]
    AlreadyTaken,

    /// The computation panicked before producing a result.
    #[error("task panicked before producing a result")]
    Panicked,
}

/// Where a [`BackgroundTask`] is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    /// Still running.
    Pending,

    /// Finished; the result is waiting to be read.
    Complete,

    /// Finished, and the result has been read.
    Taken,
}

/// A single computation running on its own thread, whose result is read exactly once.
///
/// The owner polls [`BackgroundTask::is_done`] without blocking and, once it reports `true`,
/// calls [`BackgroundTask::result`]. There is no cancellation: dropping the handle simply
/// discards the result, and the thread runs to completion on its own.
#[derive(Debug)]
pub struct BackgroundTask<T> {
    /// Handle to the worker thread, until its result has been taken.
    handle: Option<JoinHandle<T>>,
}

impl<T: Send + 'static> BackgroundTask<T> {
    /// Starts running `f` on a new thread.
    pub fn spawn<F>(f: F) -> Self
    where
        F: FnOnce() -> T + Send + 'static,
    {
        Self {
            handle: Some(thread::spawn(f)),
        }
    }
}

impl<T> BackgroundTask<T> {
    /// Returns the current [`TaskStatus`] without blocking.
    #[inline(always)]
    pub fn status(&self) -> TaskStatus {
        match &self.handle {
            None => TaskStatus::Taken,
            Some(handle) if handle.is_finished() => TaskStatus::Complete,
            Some(_) => TaskStatus::Pending,
        }
    }

    /// Returns `true` once the computation has finished, whether or not its result was read.
    #[inline(always)]
    pub fn is_done(&self) -> bool {
        self.status() != TaskStatus::Pending
    }

    /// Reads the result of the computation.
    ///
    /// Never blocks: if the computation is still running, this returns [`TaskError::NotFinished`]
    /// and the task can be read again later.
    pub fn result(&mut self) -> Result<T, TaskError> {
        match self.status() {
            TaskStatus::Pending => Err(TaskError::NotFinished),
            TaskStatus::Taken => Err(TaskError::AlreadyTaken),
            TaskStatus::Complete => {
                let handle = self.handle.take().ok_or(TaskError::AlreadyTaken)?;
                handle.join().map_err(|_| TaskError::Panicked)
            }
        }
    }

    /// Blocks until the computation finishes, then reads its result.
    pub fn wait(&mut self) -> Result<T, TaskError> {
        let handle = self.handle.take().ok_or(TaskError::AlreadyTaken)?;
        handle.join().map_err(|_| TaskError::Panicked)
    }
}

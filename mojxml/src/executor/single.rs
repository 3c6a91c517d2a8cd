//! Exécuteur séquentiel

use std::sync::mpsc::Sender;

use super::pool::{Backend, BoundedPool, TaskResult};
use super::{Completed, Executor, Source};
use crate::error::MojxmlError;
use crate::parser::parse_raw;
use crate::types::ParseOptions;

/// Parse chaque document sur le thread consommateur, un à la fois
pub struct SingleThreadExecutor {
    options: ParseOptions,
}

impl SingleThreadExecutor {
    pub fn new(options: ParseOptions) -> Self {
        Self { options }
    }
}

impl Backend for SingleThreadExecutor {
    fn spawn(&self, content: Vec<u8>, done: Sender<TaskResult>) {
        let _ = done.send(parse_raw(&content, &self.options).map_err(MojxmlError::from));
    }
}

impl Executor for SingleThreadExecutor {
    fn iter_process<'a>(&'a self, source: Source<'a>) -> Completed<'a> {
        Box::new(BoundedPool::new(self, source, 1))
    }

    fn pool_size(&self) -> usize {
        1
    }
}

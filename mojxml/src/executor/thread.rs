//! Exécuteur sur pool de threads rayon

use std::sync::mpsc::Sender;

use rayon::{ThreadPool, ThreadPoolBuilder};

use super::pool::{Backend, BoundedPool, TaskResult};
use super::{Completed, Executor, Source};
use crate::error::{MojxmlError, Result};
use crate::parser::parse_raw;
use crate::types::ParseOptions;

/// Parse les documents sur un pool de threads dédié
pub struct ThreadPoolExecutor {
    options: ParseOptions,
    pool: ThreadPool,
    size: usize,
}

impl ThreadPoolExecutor {
    pub fn new(options: ParseOptions, size: usize) -> Result<Self> {
        let size = size.max(1);
        let pool = ThreadPoolBuilder::new()
            .num_threads(size)
            .thread_name(|i| format!("mojxml-worker-{}", i))
            .build()
            .map_err(|e| MojxmlError::Worker(format!("cannot build thread pool: {}", e)))?;
        Ok(Self {
            options,
            pool,
            size,
        })
    }
}

impl Backend for ThreadPoolExecutor {
    fn spawn(&self, content: Vec<u8>, done: Sender<TaskResult>) {
        let options = self.options;
        self.pool.spawn(move || {
            let result = parse_raw(&content, &options).map_err(MojxmlError::from);
            // Le consommateur a pu abandonner l'itérateur
            let _ = done.send(result);
        });
    }
}

impl Executor for ThreadPoolExecutor {
    fn iter_process<'a>(&'a self, source: Source<'a>) -> Completed<'a> {
        Box::new(BoundedPool::new(self, source, self.size))
    }

    fn pool_size(&self) -> usize {
        self.size
    }
}

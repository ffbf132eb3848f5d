pub mod coordinator;
pub mod worker_pool;

use std::sync::Arc;

use crate::common::{MapReduce, MapReduceApp};
use crate::config::RunConfig;
use crate::table::Table;
use async_trait::async_trait;
use coordinator::Coordinator;
use worker_pool::{ProcessLauncher, WorkerLauncher, WorkerPool};

/// Map and reduce phases run as separate worker processes.
pub struct ProcessMapReduce {
    config: RunConfig,
    mr_app: Box<dyn MapReduceApp>,
    launcher: Arc<dyn WorkerLauncher>,
}

impl ProcessMapReduce {
    pub fn new(config: RunConfig, mr_app: Box<dyn MapReduceApp>) -> Self {
        let launcher = Arc::new(ProcessLauncher::new(&config));
        Self::with_launcher(config, mr_app, launcher)
    }

    pub fn with_launcher(
        config: RunConfig,
        mr_app: Box<dyn MapReduceApp>,
        launcher: Arc<dyn WorkerLauncher>,
    ) -> Self {
        Self {
            config,
            mr_app,
            launcher,
        }
    }
}

#[async_trait]
impl MapReduce for ProcessMapReduce {
    async fn run(self) -> anyhow::Result<Vec<Table>> {
        let pool = WorkerPool::new(self.launcher);
        let coord = Coordinator::new(self.config, self.mr_app.key_space(), pool);
        coord.start().await
    }
}

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::info;

use crate::common::{read_files_from_dir, MapReduce, MapReduceApp};
use crate::mapper::{map_file, MapStats};
use crate::reducer::reduce_table;
use crate::table::Table;

/// Single-process reference run: every file is counted into one table,
/// then keys no reducer would own are dropped, as in the process run.
pub struct SequentialMapReduce {
    input: PathBuf,
    mr_app: Box<dyn MapReduceApp>,
}

impl SequentialMapReduce {
    pub fn new(input: impl Into<PathBuf>, mr_app: Box<dyn MapReduceApp>) -> Self {
        Self {
            input: input.into(),
            mr_app,
        }
    }

    pub fn run_sync(self) -> anyhow::Result<Table> {
        let files = read_files_from_dir(&self.input)?;
        let mut mapped = Table::create()?;
        let mut stats = MapStats::default();
        for file in &files {
            map_file(self.mr_app.as_ref(), &mut mapped, file, &mut stats)?;
        }

        let routable = 0..self.mr_app.key_space() as i64;
        let mut table = Table::create()?;
        reduce_table(self.mr_app.as_ref(), &mut table, &mapped, &routable)?;
        info!(
            files = files.len(),
            lines = stats.lines,
            keys = table.len(),
            dropped = mapped.len() - table.len(),
            "sequential run finished"
        );
        Ok(table)
    }
}

#[async_trait]
impl MapReduce for SequentialMapReduce {
    async fn run(self) -> anyhow::Result<Vec<Table>> {
        let table = tokio::task::spawn_blocking(move || self.run_sync()).await??;
        Ok(vec![table])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map_reduce_apps::RequestCount;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn counts_every_file() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("a.log"),
            "2024-01-01,10.0.0.1,GET,/x,200\n2024-01-01,10.0.0.1,GET,/x,200\n",
        )
        .unwrap();
        fs::write(dir.path().join("b.log"), "2024-01-01,10.0.0.2,GET,/y,200\n").unwrap();

        let tables = SequentialMapReduce::new(dir.path(), Box::new(RequestCount))
            .run()
            .await
            .unwrap();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].lookup("10.0.0.1").unwrap().count, 2);
        assert_eq!(tables[0].lookup("10.0.0.2").unwrap().count, 1);
    }

    #[test]
    fn keys_outside_the_key_space_are_dropped() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("a.log"),
            "2024-01-01,10.0.0.1,GET,/x,200\n\
             2024-01-01,999.1.1.1,GET,/x,200\n\
             2024-01-01,300.0.0.1,GET,/x,200\n\
             2024-01-01,255.0.0.1,GET,/x,200\n",
        )
        .unwrap();

        let table = SequentialMapReduce::new(dir.path(), Box::new(RequestCount))
            .run_sync()
            .unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.total_count(), 2);
        assert!(table.lookup("999.1.1.1").is_none());
        assert!(table.lookup("300.0.0.1").is_none());
        assert!(table.lookup("255.0.0.1").is_some());
    }
}

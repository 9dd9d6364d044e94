use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use duckdb::{params, Connection, Result as DuckResult, Row};
use log::{error, info, warn};

use super::schema::DatabaseSchema;
use super::store::SensorStore;
use crate::error::Result;
use crate::types::{Axes, NewSample, SensorSample, SensorType};
use crate::utils::{from_micros, to_micros};

const SELECT_COLUMNS: &str = "id, unique_timestamp, timestamp_us, x, y, z, magnitude";

pub struct DatabaseManager {
    conn: Connection,
}

impl DatabaseManager {
    pub fn open<P: AsRef<Path>>(db_path: P, auto_create_dir: bool) -> DuckResult<Self> {
        let db_path = db_path.as_ref();

        // 确保数据目录存在
        if auto_create_dir {
            if let Some(dir) = db_path.parent().filter(|d| !d.as_os_str().is_empty()) {
                if let Err(e) = fs::create_dir_all(dir) {
                    error!("Failed to create data directory {}: {}", dir.display(), e);
                }
            }
        }

        let conn = Connection::open(db_path)?;
        info!("Database connection established at: {}", db_path.display());

        Self::with_connection(conn)
    }

    pub fn in_memory() -> DuckResult<Self> {
        let conn = Connection::open_in_memory()?;
        info!("In-memory database connection established");
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> DuckResult<Self> {
        DatabaseSchema::create_tables(&conn)?;
        Ok(DatabaseManager { conn })
    }

    fn read_sample(row: &Row<'_>) -> DuckResult<SensorSample> {
        Ok(SensorSample {
            id: row.get::<_, i64>(0)?,
            sequence_key: row.get::<_, f64>(1)?,
            recorded_at: from_micros(row.get::<_, i64>(2)?),
            axes: Axes {
                x: row.get::<_, Option<f64>>(3)?,
                y: row.get::<_, Option<f64>>(4)?,
                z: row.get::<_, Option<f64>>(5)?,
                magnitude: row.get::<_, Option<f64>>(6)?,
            },
        })
    }
}

impl SensorStore for DatabaseManager {
    fn insert_batch(&mut self, sensor: SensorType, samples: &[NewSample]) -> Result<usize> {
        if samples.is_empty() {
            warn!("No {} data to save", sensor);
            return Ok(0);
        }

        // 整批放在一个事务里，出错时 tx 被丢弃即回滚
        let tx = self.conn.transaction()?;
        let mut count = 0;
        {
            let mut stmt = tx.prepare(&format!(
                "INSERT INTO {} (unique_timestamp, timestamp_us, x, y, z, magnitude)
                 VALUES (?, ?, ?, ?, ?, ?)",
                sensor.table_name()
            ))?;

            for sample in samples {
                stmt.execute(params![
                    sample.sequence_key,
                    to_micros(&sample.recorded_at),
                    sample.axes.x,
                    sample.axes.y,
                    sample.axes.z,
                    sample.axes.magnitude
                ])?;
                count += 1;
            }
        }
        tx.commit()?;

        info!("Saved {} {} records to database", count, sensor);
        Ok(count)
    }

    fn list_all(&self, sensor: SensorType) -> Result<Vec<SensorSample>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM {} ORDER BY id",
            SELECT_COLUMNS,
            sensor.table_name()
        ))?;

        let rows = stmt.query_map([], Self::read_sample)?;
        let samples = rows.collect::<DuckResult<Vec<_>>>()?;
        Ok(samples)
    }

    fn query_range(
        &self,
        sensor: SensorType,
        start: &DateTime<Utc>,
        end: &DateTime<Utc>,
    ) -> Result<Vec<SensorSample>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM {}
             WHERE timestamp_us >= ? AND timestamp_us <= ?
             ORDER BY id",
            SELECT_COLUMNS,
            sensor.table_name()
        ))?;

        let rows = stmt.query_map(params![to_micros(start), to_micros(end)], Self::read_sample)?;
        let samples = rows.collect::<DuckResult<Vec<_>>>()?;
        Ok(samples)
    }

    fn count(&self, sensor: SensorType) -> Result<usize> {
        let count = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", sensor.table_name()),
            [],
            |row| Ok(row.get::<_, i64>(0)? as usize),
        )?;
        Ok(count)
    }
}

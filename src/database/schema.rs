use duckdb::{Connection, Result as DuckResult};
use log::info;

use crate::types::SensorType;

pub struct DatabaseSchema;

impl DatabaseSchema {
    pub fn create_tables(conn: &Connection) -> DuckResult<()> {
        for sensor in SensorType::ALL {
            let table = sensor.table_name();
            let existed = Self::check_table_exists(conn, table)?;

            Self::create_stream_table(conn, table)?;

            if existed {
                info!("Table {} already exists", table);
            } else {
                info!("Created table {}", table);
            }
        }

        info!("Database schema ready");
        Ok(())
    }

    fn create_stream_table(conn: &Connection, table: &str) -> DuckResult<()> {
        conn.execute(&format!("CREATE SEQUENCE IF NOT EXISTS {}_seq", table), [])?;

        // unique_timestamp 是排序/身份键，timestamp_us 是传感器上报时间(可重复)
        conn.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS {table} (
                    id BIGINT PRIMARY KEY DEFAULT nextval('{table}_seq'),
                    unique_timestamp DOUBLE NOT NULL UNIQUE,
                    timestamp_us BIGINT NOT NULL,
                    x DOUBLE,
                    y DOUBLE,
                    z DOUBLE,
                    magnitude DOUBLE,
                    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
                )",
                table = table
            ),
            [],
        )?;

        conn.execute(
            &format!(
                "CREATE INDEX IF NOT EXISTS {table}_timestamp_idx ON {table} (timestamp_us)",
                table = table
            ),
            [],
        )?;

        Ok(())
    }

    pub fn check_table_exists(conn: &Connection, table_name: &str) -> DuckResult<bool> {
        conn.query_row(
            "SELECT COUNT(*) FROM information_schema.tables WHERE table_name = ?",
            [table_name],
            |row| Ok(row.get::<_, i64>(0)? > 0),
        )
    }
}

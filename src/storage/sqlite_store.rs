use super::CampaignStore;
use crate::campaign::Campaign;
use crate::customer::{parse_date, CustomerRecord};
use crate::error::{DashboardError, Result};
use rusqlite::types::Value;
use rusqlite::{params, Connection, OpenFlags};
use std::path::Path;

/// Campaigns in the `campanhas` table, ordered by rowid.
pub struct SqliteCampaignStore {
    conn: Connection,
}

impl SqliteCampaignStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        Self::init_database(&conn)?;
        Ok(Self { conn })
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_database(&conn)?;
        Ok(Self { conn })
    }

    fn init_database(conn: &Connection) -> Result<()> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS campanhas (
                nome TEXT NOT NULL,
                grupo_alvo TEXT NOT NULL,
                mensagem TEXT NOT NULL,
                data_envio TEXT NOT NULL
            )",
            [],
        )?;
        Ok(())
    }
}

impl CampaignStore for SqliteCampaignStore {
    fn load(&self) -> Result<Vec<Campaign>> {
        let mut stmt = self
            .conn
            .prepare("SELECT nome, grupo_alvo, mensagem, data_envio FROM campanhas ORDER BY rowid")?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(name, target_bucket, message, send_date)| -> Result<Campaign> {
                let send_date = parse_date(&send_date).map_err(|e| {
                    DashboardError::InvalidInput(format!("campaign '{name}': {e}"))
                })?;
                Ok(Campaign {
                    name,
                    target_bucket,
                    message,
                    send_date,
                })
            })
            .collect()
    }

    fn append(&mut self, campaign: &Campaign) -> Result<()> {
        self.conn.execute(
            "INSERT INTO campanhas (nome, grupo_alvo, mensagem, data_envio) VALUES (?, ?, ?, ?)",
            params![
                campaign.name,
                campaign.target_bucket,
                campaign.message,
                campaign.send_date.format("%Y-%m-%d").to_string()
            ],
        )?;
        Ok(())
    }
}

/// Read the `clientes` table.
pub fn load_customers_sqlite<P: AsRef<Path>>(path: P) -> Result<Vec<CustomerRecord>> {
    let conn = Connection::open_with_flags(path.as_ref(), OpenFlags::SQLITE_OPEN_READ_ONLY)?;
    read_customers(&conn)
}

fn read_customers(conn: &Connection) -> Result<Vec<CustomerRecord>> {
    let mut stmt = conn.prepare(
        "SELECT nome, telefone, email, ultimo_pedido, qtd_pedidos FROM clientes ORDER BY rowid",
    )?;

    // Columns are read untyped; SQLite does not enforce the declared types.
    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, Value>(0)?,
                row.get::<_, Value>(1)?,
                row.get::<_, Value>(2)?,
                row.get::<_, Value>(3)?,
                row.get::<_, Value>(4)?,
            ))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    rows.into_iter()
        .enumerate()
        .map(|(index, (name, phone, email, last_order_date, order_count))| -> Result<CustomerRecord> {
            let row = index + 1;
            let name = text_column(name, row, "nome")?.ok_or_else(|| {
                DashboardError::InvalidInput(format!("clientes row {row}: missing nome"))
            })?;
            Ok(CustomerRecord {
                phone: text_column(phone, row, "telefone")?.unwrap_or_default(),
                email: text_column(email, row, "email")?.unwrap_or_default(),
                last_order_date: text_column(last_order_date, row, "ultimo_pedido")?,
                order_count: count_column(order_count, row, &name)?,
                name,
            })
        })
        .collect()
}

fn text_column(value: Value, row: usize, column: &str) -> Result<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::Text(text) => Ok(Some(text)),
        Value::Integer(number) => Ok(Some(number.to_string())),
        Value::Real(number) => Ok(Some(number.to_string())),
        Value::Blob(_) => Err(DashboardError::InvalidInput(format!(
            "clientes row {row}: {column} is a blob"
        ))),
    }
}

fn count_column(value: Value, row: usize, name: &str) -> Result<u32> {
    let invalid = |detail: String| {
        DashboardError::InvalidInput(format!("clientes row {row} ({name}): qtd_pedidos {detail}"))
    };
    match value {
        Value::Null => Ok(0),
        Value::Integer(number) => {
            u32::try_from(number).map_err(|_| invalid(format!("{number} out of range")))
        }
        Value::Real(number)
            if number.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(&number) =>
        {
            Ok(number as u32)
        }
        Value::Real(number) => Err(invalid(format!("{number} is not a whole count"))),
        Value::Text(text) => text
            .trim()
            .parse::<u32>()
            .map_err(|_| invalid(format!("'{text}' is not a count"))),
        Value::Blob(_) => Err(invalid("is a blob".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_append_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard.db");
        let date = NaiveDate::from_ymd_opt(2024, 9, 10).unwrap();

        {
            let mut store = SqliteCampaignStore::open(&path).unwrap();
            store.append(&Campaign::new("A", "0-10 dias", "primeira", date)).unwrap();
            store.append(&Campaign::new("B", "0-10 dias", "segunda", date)).unwrap();
        }

        let store = SqliteCampaignStore::open(&path).unwrap();
        let loaded = store.load().unwrap();
        let messages: Vec<&str> = loaded.iter().map(|c| c.message.as_str()).collect();
        assert_eq!(messages, vec!["primeira", "segunda"]);
        assert_eq!(loaded[0].send_date, date);
    }

    #[test]
    fn test_in_memory_store_starts_empty() {
        let store = SqliteCampaignStore::in_memory().unwrap();
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_read_customers() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE clientes (nome TEXT, telefone TEXT, email TEXT, ultimo_pedido TEXT, qtd_pedidos INTEGER);
             INSERT INTO clientes VALUES ('Maria', '11 9999', 'maria@example.com', '2024-06-01 00:00:00', 3);
             INSERT INTO clientes VALUES ('João', NULL, NULL, NULL, NULL);",
        )
        .unwrap();

        let customers = read_customers(&conn).unwrap();
        assert_eq!(customers.len(), 2);
        assert_eq!(customers[0].last_order_date.as_deref(), Some("2024-06-01 00:00:00"));
        assert_eq!(customers[0].order_count, 3);
        assert_eq!(customers[1].phone, "");
        assert_eq!(customers[1].last_order_date, None);
    }

    #[test]
    fn test_negative_order_count_is_invalid_input() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE clientes (nome TEXT, telefone TEXT, email TEXT, ultimo_pedido TEXT, qtd_pedidos INTEGER);
             INSERT INTO clientes VALUES ('Maria', '1', 'm@x.com', '2024-06-01', -1);",
        )
        .unwrap();
        assert!(matches!(read_customers(&conn), Err(DashboardError::InvalidInput(_))));
    }

    fn customers_table(rows: &str) -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(&format!(
            "CREATE TABLE clientes (nome TEXT, telefone INTEGER, email TEXT, ultimo_pedido TEXT, qtd_pedidos INTEGER);
             {rows}"
        ))
        .unwrap();
        conn
    }

    fn assert_invalid_row(conn: &Connection, row: &str) {
        match read_customers(conn) {
            Err(DashboardError::InvalidInput(msg)) => assert!(msg.contains(row), "{msg}"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_null_name_is_invalid_input() {
        let conn = customers_table(
            "INSERT INTO clientes VALUES ('Maria', NULL, NULL, '2024-06-01', 1);
             INSERT INTO clientes VALUES (NULL, NULL, NULL, '2024-06-01', 1);",
        );
        assert_invalid_row(&conn, "row 2");
    }

    #[test]
    fn test_fractional_order_count_is_invalid_input() {
        let conn = customers_table("INSERT INTO clientes VALUES ('Maria', NULL, NULL, '2024-06-01', 2.5);");
        assert_invalid_row(&conn, "row 1");
    }

    #[test]
    fn test_text_order_count_is_invalid_input() {
        let conn = customers_table("INSERT INTO clientes VALUES ('Maria', NULL, NULL, '2024-06-01', 'muitos');");
        assert_invalid_row(&conn, "row 1");
    }

    #[test]
    fn test_loosely_typed_columns_are_converted() {
        let conn = customers_table(
            "INSERT INTO clientes VALUES ('Maria', 11999990000, NULL, '2024-06-01', '4');
             INSERT INTO clientes VALUES ('Ana', NULL, NULL, '2024-06-01', 3.0);",
        );
        let customers = read_customers(&conn).unwrap();
        assert_eq!(customers[0].phone, "11999990000");
        assert_eq!(customers[0].order_count, 4);
        assert_eq!(customers[1].order_count, 3);
    }
}

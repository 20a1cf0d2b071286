use super::CampaignStore;
use crate::campaign::Campaign;
use crate::customer::{CustomerRecord, EnrichedCustomer};
use crate::error::{DashboardError, Result};
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Campaigns in a CSV file with a header row.
pub struct CsvCampaignStore {
    path: PathBuf,
}

impl CsvCampaignStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl CampaignStore for CsvCampaignStore {
    fn load(&self) -> Result<Vec<Campaign>> {
        if !self.path.exists() {
            log::debug!("Campaign file {} not found, starting empty", self.path.display());
            return Ok(Vec::new());
        }
        read_rows(&self.path)
    }

    fn append(&mut self, campaign: &Campaign) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)?;
        let needs_header = file.metadata()?.len() == 0;
        if !needs_header && !ends_with_newline(&mut file)? {
            file.write_all(b"\n")?;
        }

        let mut writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);
        writer.serialize(campaign)?;
        writer.flush()?;
        Ok(())
    }
}

/// Last byte is a line terminator. Hand-edited files often lack one.
fn ends_with_newline(file: &mut File) -> Result<bool> {
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

pub fn load_customers_csv<P: AsRef<Path>>(path: P) -> Result<Vec<CustomerRecord>> {
    read_rows(path.as_ref())
}

/// Export the enriched view, one row per customer.
pub fn write_customers_csv<P: AsRef<Path>>(path: P, customers: &[EnrichedCustomer]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path.as_ref())?;
    for customer in customers {
        writer.serialize(customer)?;
    }
    writer.flush()?;
    Ok(())
}

fn read_rows<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)?;

    let mut rows = Vec::new();
    for (index, row) in reader.deserialize().enumerate() {
        let row = row.map_err(|e| match e.kind() {
            csv::ErrorKind::Io(_) => DashboardError::Storage(e.to_string()),
            _ => DashboardError::InvalidInput(format!(
                "{} row {}: {e}",
                path.display(),
                index + 1
            )),
        })?;
        rows.push(row);
    }
    Ok(rows)
}

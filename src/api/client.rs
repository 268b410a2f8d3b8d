use super::models::{DnsRecord, RecordError};
use async_trait::async_trait;
use log::info;
use serde_json::{Map, Value};

/// Record and domain operations against a registrar's DNS API.
///
/// Network, HTTP and API failures never surface as errors here:
/// implementations log them and answer with an empty list, `None` or
/// `false`. A record row the server sent that cannot be rebuilt is a broken
/// data contract and comes back as `Err`.
#[async_trait]
pub trait DnsApiClient: Send + Sync {
    async fn list_records(&self, domain: &str) -> Result<Vec<DnsRecord>, RecordError>;

    async fn delete_record(&self, domain: &str, record_id: &str) -> bool;

    async fn create_record(
        &self,
        domain: &str,
        record: &DnsRecord,
    ) -> Result<Option<DnsRecord>, RecordError>;

    async fn update_nameservers(&self, domain: &str, nameservers: &[String]) -> bool;

    async fn domain_exists(&self, domain: &str) -> bool;

    async fn get_domain_info(&self, domain: &str) -> Option<Map<String, Value>>;

    async fn get_record(
        &self,
        domain: &str,
        record_id: &str,
    ) -> Result<Option<DnsRecord>, RecordError> {
        Ok(self
            .list_records(domain)
            .await?
            .into_iter()
            .find(|record| record.record_id.as_deref() == Some(record_id)))
    }

    async fn find_record(
        &self,
        domain: &str,
        content: &str,
    ) -> Result<Option<DnsRecord>, RecordError> {
        Ok(self
            .list_records(domain)
            .await?
            .into_iter()
            .find(|record| record.content == content))
    }

    /// Best-effort replace: removes the record whose content matches, then
    /// creates `record`.
    ///
    /// The outcome of the delete is not checked, so a failed delete can leave
    /// the old record next to the new one. Returns whatever the create
    /// returned. A lookup that hits a malformed row stops before anything is
    /// deleted or created.
    async fn update_record(
        &self,
        domain: &str,
        content: &str,
        record: &DnsRecord,
    ) -> Result<Option<DnsRecord>, RecordError> {
        if let Some(record_id) = self
            .find_record(domain, content)
            .await?
            .and_then(|found| found.record_id)
        {
            info!("Replacing record {record_id} in {domain}");
            self.delete_record(domain, &record_id).await;
        }
        self.create_record(domain, record).await
    }
}

use super::ListResponse;
use crate::clients::{ApiResult, HttpClient};
use crate::models::{Sector, SectorDraft};

/// `sectors` resource
#[derive(Clone, Debug)]
pub struct SectorService {
    http: HttpClient,
}

impl SectorService {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub async fn list(&self) -> ApiResult<Vec<Sector>> {
        let sectors: ListResponse<Sector> = self.http.get("sectors").await?;
        Ok(sectors.into_vec())
    }

    pub async fn get(&self, sector_id: &str) -> ApiResult<Sector> {
        self.http.get(&format!("sectors/{sector_id}")).await
    }

    pub async fn create(&self, draft: &SectorDraft) -> ApiResult<Sector> {
        self.http.post("sectors", draft).await
    }

    pub async fn update(&self, sector_id: &str, draft: &SectorDraft) -> ApiResult<Sector> {
        self.http.put(&format!("sectors/{sector_id}"), draft).await
    }

    pub async fn delete(&self, sector_id: &str) -> ApiResult<()> {
        self.http.delete(&format!("sectors/{sector_id}")).await
    }
}

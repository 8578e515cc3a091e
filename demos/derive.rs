use batchsvc_rs::{BatchClient, Credentials, ListResource};

#[derive(ListResource, serde::Deserialize, Debug, Clone)]
#[batch(path = "pools", list = "value")]
#[serde(rename_all = "camelCase")]
pub struct PoolSummary {
    pub id: String,
    pub vm_size: Option<String>,
}

#[tokio::main]
async fn main() {
    dotenvy::from_filename("tests/.env").ok();

    let client = BatchClient::builder()
        .base_url(std::env::var("BATCH_URL").expect("BATCH_URL not set"))
        .credentials(Credentials::new(
            std::env::var("BATCH_TOKEN").expect("BATCH_TOKEN not set").as_str(),
        ))
        .build()
        .into_client()
        .expect("invalid client configuration");

    let pools = PoolSummary::list(&client, None)
        .await
        .expect("failed to fetch the first page")
        .collect_all()
        .await
        .expect("failed to collect all");

    for pool in pools {
        println!("{}: {:?}", pool.id, pool.vm_size);
    }
}

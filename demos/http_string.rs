use batchsvc_rs::{requests::RequestToHttpString, BatchClient, Credentials, ListOptions};

fn main() {
    let base_url = std::env::var("BATCH_URL").expect("BATCH_URL not set");
    let token = std::env::var("BATCH_TOKEN").expect("BATCH_TOKEN not set");

    let client = BatchClient::builder()
        .base_url(base_url)
        .credentials(Credentials::new(&token))
        .build()
        .into_client()
        .expect("invalid client configuration");

    let endpoint = client
        .job_schedules()
        .endpoint::<serde_json::Value>()
        .expect("invalid endpoint");
    let options = ListOptions::builder()
        .filter("state eq 'active'")
        .max_results(10)
        .client_request_id("http-string-demo")
        .build();
    let request = endpoint
        .prepare_first_request(&options)
        .expect("invalid request");

    println!("{}", request.to_http_string().unwrap());
}

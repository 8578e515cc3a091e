use batchsvc_rs::futures::StreamExt;
use batchsvc_rs::{BatchClient, Credentials, JobSchedule, ListOptions, ListResource};

#[tokio::main]
async fn main() {
    dotenvy::from_filename("tests/.env").ok();

    let base_url = std::env::var("BATCH_URL").expect("BATCH_URL not set");
    let token = std::env::var("BATCH_TOKEN").expect("BATCH_TOKEN not set");

    let client = BatchClient::builder()
        .base_url(base_url)
        .credentials(Credentials::new(&token))
        .build()
        .into_client()
        .expect("invalid client configuration");

    // Example 1: Manual iteration, 100 items per page
    println!("=== Manual iteration (100 items per page) ===");
    let mut cursor = JobSchedule::list(
        &client,
        Some(ListOptions::builder().max_results(100).build()),
    )
    .await
    .expect("failed to fetch the first page");

    let mut page_count = 1;
    println!("Page 1: {} items", cursor.current_page().len());
    while let Some(schedules) = cursor.advance().await.expect("failed to fetch page") {
        page_count += 1;
        println!("Page {}: {} items", page_count, schedules.len());
        for schedule in schedules {
            println!("  Schedule: {}", schedule.id);
        }

        if page_count >= 3 {
            break;
        }
    }

    // Example 2: Stream the active schedules
    println!("\n=== Stream active schedules ===");
    let options = ListOptions::builder()
        .filter("state eq 'active'")
        .select("id,state")
        .build();
    let mut schedules = Box::pin(
        client
            .job_schedules()
            .list::<JobSchedule>(Some(options))
            .await
            .expect("failed to fetch the first page")
            .into_stream(),
    );
    while let Some(schedule) = schedules.next().await {
        let schedule = schedule.expect("failed to fetch page");
        println!("  {} ({:?})", schedule.id, schedule.state);
    }

    // Example 3: Collect all items
    println!("\n=== Collect all items ===");
    let all = JobSchedule::list(&client, None)
        .await
        .expect("failed to fetch the first page")
        .collect_all()
        .await
        .expect("failed to collect all");
    println!("Total schedules collected: {}", all.len());
}

use batchsvc_rs::{
    BatchClient, Credentials, DriverState, ListOptions, PageConsumer, PagingDecision, PushDriver,
    Task,
};

/// Prints tasks until `limit` of them were seen.
struct TaskPrinter {
    seen: usize,
    limit: usize,
}

impl PageConsumer<Task> for TaskPrinter {
    fn items_received(&mut self, items: &[Task]) {
        for task in items {
            println!("  Task: {} ({:?})", task.id, task.state);
        }
    }

    fn page_completed(&mut self, items: &[Task]) -> PagingDecision {
        self.seen += items.len();
        if self.seen >= self.limit {
            PagingDecision::Stop
        } else {
            PagingDecision::Continue
        }
    }
}

#[tokio::main]
async fn main() {
    dotenvy::from_filename("tests/.env").ok();

    let base_url = std::env::var("BATCH_URL").expect("BATCH_URL not set");
    let token = std::env::var("BATCH_TOKEN").expect("BATCH_TOKEN not set");
    let job_id = std::env::var("BATCH_JOB_ID").expect("BATCH_JOB_ID not set");

    let client = BatchClient::builder()
        .base_url(base_url)
        .credentials(Credentials::new(&token))
        .build()
        .into_client()
        .expect("invalid client configuration");

    let endpoint = client
        .tasks()
        .endpoint::<Task>(&job_id)
        .expect("invalid job id");
    let handle = PushDriver::new(endpoint, TaskPrinter { seen: 0, limit: 250 })
        .spawn(Some(ListOptions::builder().max_results(100).build()))
        .expect("invalid options");

    let mut state = handle.watch_state();
    tokio::spawn(async move {
        while state.changed().await.is_ok() {
            let current = *state.borrow_and_update();
            if let DriverState::Fetching { page } = current {
                println!("Fetching page {page}");
            }
            if current.is_finished() {
                break;
            }
        }
    });

    match handle.join().await {
        Ok(summary) => println!(
            "{} tasks on {} pages (stopped early: {})",
            summary.items.len(),
            summary.pages,
            summary.stopped_early
        ),
        Err(failure) => eprintln!(
            "{} ({} tasks received before the failure)",
            failure,
            failure.items.len()
        ),
    }
}

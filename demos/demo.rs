//! # NosqlHaus Demo
//!
//! Walks through the main pieces against the in-memory simulator:
//! - Building the factory from configuration
//! - Per-entity defaults and per-repository overrides
//! - CRUD, sorting and paging
//! - Prepared statement reuse through the query cache
//! - Streaming reads

use futures::StreamExt;
use nosqlhaus::prelude::*;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub customer: String,
    pub total_cents: u64,
}

impl NosqlEntity for Order {
    type Id = Uuid;

    fn table_name() -> &'static str {
        "orders"
    }

    fn entity_name() -> &'static str {
        "Order"
    }

    fn id(&self) -> Option<Uuid> {
        Some(self.id)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🚀 NosqlHaus Demo");
    println!("=================");

    // 1. Factory setup
    println!("\n📊 Step 1: Factory Setup");
    let config = NosqlConfig::new(
        HandleConfig::new("http://localhost:8080", AuthConfig::Simulated)
            .with_user_agent("orders-demo/1.0"),
    )
    .with_query_cache(QueryCacheConfig::new(100, 60_000));

    let connector = Arc::new(MemoryConnector::new());
    let mut nosqlhaus = NosqlHaus::new(config, connector.clone())?;
    nosqlhaus.register_defaults_for::<Order>(
        EntityDefaults::new()
            .with_consistency(Consistency::Absolute)
            .with_durability(Durability::CommitSync),
    );
    println!("✅ User agent: {}", nosqlhaus.user_agent());
    println!("   Handle created yet: {}", nosqlhaus.is_initialized());

    // 2. Repository options
    println!("\n⚙️  Step 2: Repository Options");
    let mut orders = nosqlhaus.repository::<Order>().await?;
    println!(
        "   Effective: timeout={} ms, consistency={}, durability={}",
        orders.timeout(),
        orders.consistency(),
        orders.durability()
    );
    orders.set_timeout(2_000);
    orders.set_durability("not-a-durability");
    println!(
        "   After overrides: timeout={} ms, durability={}",
        orders.timeout(),
        orders.durability()
    );
    if let Err(e) = orders.set_consistency("not-a-consistency") {
        println!("   Rejected consistency: {}", e);
    }

    // 3. CRUD
    println!("\n📝 Step 3: CRUD");
    let seeded: Vec<Order> = [("alice", 1_250), ("bob", 9_900), ("carol", 4_300), ("dave", 700)]
        .into_iter()
        .map(|(customer, total_cents)| Order {
            id: Uuid::new_v4(),
            customer: customer.to_string(),
            total_cents,
        })
        .collect();
    let first_id = seeded[0].id;
    orders.save_all(seeded).await?;
    println!("✅ Saved {} orders", orders.count().await?);

    if let Some(order) = orders.find_by_id(&first_id).await? {
        println!("   Found {} ({} cents)", order.customer, order.total_cents);
    }

    // 4. Sorting and paging
    println!("\n🔎 Step 4: Sorting and Paging");
    let largest = orders.find_all_sorted(&Sort::desc("total_cents")).await?;
    for order in &largest {
        println!("   {:>6} {}", order.total_cents, order.customer);
    }

    let mut request = PageRequest::of(0, 3).with_sort(Sort::asc("customer"));
    loop {
        let page = orders.find_all_paged(&request).await?;
        let names: Vec<_> = page.content.iter().map(|o| o.customer.as_str()).collect();
        println!(
            "   Page {}/{}: {:?}",
            page.number + 1,
            page.total_pages(),
            names
        );
        if !page.has_next() {
            break;
        }
        request = request.next();
    }

    // 5. Query cache
    println!("\n🗄️  Step 5: Query Cache");
    orders.find_all().await?;
    orders.find_all().await?;
    let stats = nosqlhaus.query_cache().stats();
    println!(
        "   Cached statements: {} (hits={}, misses={})",
        nosqlhaus.query_cache().len(),
        stats.hits,
        stats.misses
    );
    if let Some(handle) = connector.handle() {
        println!("   Statements prepared by the store: {}", handle.prepare_count());
    }

    // 6. Streams
    println!("\n🌊 Step 6: Streaming");
    let mut stream = orders.find_all_stream();
    while let Some(order) = stream.next().await {
        println!("   streamed {}", order?.customer);
    }
    drop(stream);

    // 7. Cleanup
    println!("\n🧹 Step 7: Cleanup");
    println!("   Deleted {} orders", orders.delete_all().await?);
    nosqlhaus.close().await?;
    nosqlhaus.close().await?;
    println!("✅ Closed: {}", nosqlhaus.is_closed());

    Ok(())
}

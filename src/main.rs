use chrono::{Local, NaiveDate};
use clap::{Arg, ArgMatches, Command};
use log::LevelFilter;
use pizzeria_dashboard::customer::parse_date;
use pizzeria_dashboard::config::StorageConfig;
use pizzeria_dashboard::{
    storage, top_n, ActivityView, Campaign, CampaignRegistry, CustomerFilter, Dashboard,
    DashboardConfig, EnrichedCustomer, RecencyBucket, SortKey, ViewOrder,
};
use std::path::Path;
use std::process;
use std::str::FromStr;

fn main() {
    let matches = Command::new("pizzeria-dashboard")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Customer recency dashboard and campaign registry for a pizzeria")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path (TOML or YAML)")
                .default_value(DashboardConfig::default_path()),
        )
        .arg(
            Arg::new("generate-config")
                .long("generate-config")
                .value_name("FILE")
                .help("Generate a default configuration file")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("test-config")
                .long("test-config")
                .help("Load customers and campaigns and report what was found")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable debug logging")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("today")
                .long("today")
                .value_name("DATE")
                .help("Reference date for recency (default: local date)"),
        )
        .arg(
            Arg::new("bucket")
                .long("bucket")
                .value_name("BUCKET")
                .help("Only customers in this bucket, e.g. \"11-20 dias\" (default: all)"),
        )
        .arg(
            Arg::new("from")
                .long("from")
                .value_name("DATE")
                .help("Last order on or after this date"),
        )
        .arg(
            Arg::new("to")
                .long("to")
                .value_name("DATE")
                .help("Last order on or before this date"),
        )
        .arg(
            Arg::new("search")
                .short('s')
                .long("search")
                .value_name("TEXT")
                .help("Match name, phone or email (case-insensitive)"),
        )
        .arg(
            Arg::new("view")
                .long("view")
                .value_name("VIEW")
                .help("all, active or inactive")
                .default_value("all"),
        )
        .arg(
            Arg::new("sort")
                .long("sort")
                .value_name("KEY")
                .help("Sort by orders, days or name"),
        )
        .arg(
            Arg::new("asc")
                .long("asc")
                .help("Sort ascending instead of descending")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("top")
                .long("top")
                .help("Show the top customers by the configured ranking key")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("stats")
                .long("stats")
                .help("Show the bucket distribution and summary")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("list-campaigns")
                .long("list-campaigns")
                .help("List registered campaigns")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("add-campaign")
                .long("add-campaign")
                .help("Register a campaign (needs --name, --target, --message)")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(Arg::new("name").long("name").value_name("NAME").help("Campaign name"))
        .arg(
            Arg::new("target")
                .long("target")
                .value_name("BUCKET")
                .help("Campaign target bucket"),
        )
        .arg(
            Arg::new("message")
                .long("message")
                .value_name("TEXT")
                .help("Campaign message"),
        )
        .arg(
            Arg::new("send-date")
                .long("send-date")
                .value_name("DATE")
                .help("Planned send date (default: today)"),
        )
        .arg(
            Arg::new("export")
                .long("export")
                .value_name("FILE")
                .help("Write the filtered customer view to a CSV file")
                .action(clap::ArgAction::Set),
        )
        .get_matches();

    if let Some(generate_path) = matches.get_one::<String>("generate-config") {
        generate_default_config(generate_path);
        return;
    }

    let config_path = matches
        .get_one::<String>("config")
        .map(String::as_str)
        .unwrap_or(DashboardConfig::default_path());

    let config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {e:#}");
            process::exit(1);
        }
    };

    init_logging(&matches, &config);
    if !Path::new(config_path).exists() {
        log::warn!("Configuration file '{config_path}' not found, using default configuration");
    }

    let today = match matches.get_one::<String>("today") {
        Some(raw) => or_exit(parse_date(raw), "Invalid --today"),
        None => Local::now().date_naive(),
    };

    if matches.get_flag("add-campaign") || matches.get_flag("list-campaigns") {
        let mut registry = or_exit(
            CampaignRegistry::from_storage(&config.storage, config.campaigns.clone()),
            "Failed to load campaigns",
        );
        if matches.get_flag("add-campaign") {
            add_campaign(&mut registry, &config.storage, &matches, today);
        } else {
            print_campaigns(registry.list());
        }
        return;
    }

    let dashboard = or_exit(
        Dashboard::open(&config.storage, config.campaigns.clone()),
        "Failed to load dashboard data",
    );

    if matches.get_flag("test-config") {
        println!("🔍 Testing configuration...");
        println!();
        println!("Storage backend: {:?}", config.storage.backend);
        println!("Customers loaded: {}", dashboard.customers().len());
        println!("Campaigns loaded: {}", dashboard.campaigns().len());
        match dashboard.enriched(today) {
            Ok(_) => println!("✅ All customer rows segmented successfully"),
            Err(e) => {
                println!("❌ Customer data validation failed:");
                println!("Error: {e}");
                process::exit(1);
            }
        }
        return;
    }

    if matches.get_flag("stats") {
        show_stats(&dashboard, today);
        return;
    }

    if matches.get_flag("top") {
        let enriched = or_exit(dashboard.enriched(today), "Failed to segment customers");
        let key = config.dashboard.sort_key;
        let ranked = top_n(&enriched, key, config.dashboard.top_n);
        println!("🏆 Top {} customers by {:?}", config.dashboard.top_n, key);
        print_customers(&ranked);
        return;
    }

    let predicates = or_exit(build_filter(&matches), "Invalid filter");
    let ordering = match matches.get_one::<String>("sort") {
        Some(raw) => Some(ViewOrder {
            key: or_exit(SortKey::from_str(raw), "Invalid --sort"),
            descending: !matches.get_flag("asc"),
        }),
        None => None,
    };

    if let Some(export_path) = matches.get_one::<String>("export") {
        let written = or_exit(
            dashboard.export_csv(export_path, today, &predicates, ordering),
            "Export failed",
        );
        println!("✅ Exported {written} customers to {export_path}");
        return;
    }

    let view = or_exit(dashboard.view(today, &predicates, ordering), "Failed to build view");
    println!("📊 Customers as of {today}");
    print_customers(&view);
}

fn init_logging(matches: &ArgMatches, config: &DashboardConfig) {
    let log_level = if matches.get_flag("verbose") {
        LevelFilter::Debug
    } else {
        config
            .logging
            .as_ref()
            .and_then(|logging| LevelFilter::from_str(&logging.level).ok())
            .unwrap_or(LevelFilter::Info)
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();
}

fn load_config(path: &str) -> anyhow::Result<DashboardConfig> {
    if Path::new(path).exists() {
        DashboardConfig::load_from_file(path)
    } else {
        Ok(DashboardConfig::default())
    }
}

fn generate_default_config(path: &str) {
    let config = DashboardConfig::default();
    match config.to_file(path) {
        Ok(()) => {
            println!("Default configuration written to: {path}");
            println!("Please edit the configuration file to suit your needs.");
        }
        Err(e) => {
            eprintln!("Error writing configuration file: {e:#}");
            process::exit(1);
        }
    }
}

fn or_exit<T, E: std::fmt::Display>(result: Result<T, E>, context: &str) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            eprintln!("❌ {context}: {e}");
            process::exit(1);
        }
    }
}

fn build_filter(matches: &ArgMatches) -> pizzeria_dashboard::Result<CustomerFilter> {
    let arg = |name: &str| matches.get_one::<String>(name).map(String::as_str);
    let view = match arg("view") {
        Some(raw) => ActivityView::from_str(raw)?,
        None => ActivityView::All,
    };
    Ok(CustomerFilter::from_params(arg("bucket"), arg("from"), arg("to"), arg("search"))?
        .with_view(view))
}

fn add_campaign(
    registry: &mut CampaignRegistry,
    storage_config: &StorageConfig,
    matches: &ArgMatches,
    today: NaiveDate,
) {
    let arg = |name: &str| {
        matches
            .get_one::<String>(name)
            .cloned()
            .unwrap_or_default()
    };
    let send_date = match matches.get_one::<String>("send-date") {
        Some(raw) => or_exit(parse_date(raw), "Invalid --send-date"),
        None => today,
    };

    // Typed targets are matched loosely, stored under the exact label.
    let target = arg("target");
    let target_bucket = match RecencyBucket::from_str(&target) {
        Ok(bucket) => bucket.label().to_string(),
        Err(_) => target,
    };

    let campaign = Campaign {
        name: arg("name"),
        target_bucket,
        message: arg("message"),
        send_date,
    };

    match registry.add(campaign) {
        Ok(()) => println!("✅ Campaign saved"),
        Err(e) => {
            eprintln!("❌ {e}");
            if let Some(buckets) = present_buckets(storage_config, today) {
                let labels: Vec<&str> = buckets.iter().map(|b| b.label()).collect();
                eprintln!("   Buckets with customers today: {}", labels.join(", "));
            }
            process::exit(1);
        }
    }
}

/// Hint only; unreadable customer data just means no hint.
fn present_buckets(storage_config: &StorageConfig, today: NaiveDate) -> Option<Vec<RecencyBucket>> {
    let customers = storage::load_customers(storage_config).ok()?;
    Dashboard::new(customers, CampaignRegistry::new())
        .present_buckets(today)
        .ok()
}

fn print_campaigns(campaigns: &[Campaign]) {
    if campaigns.is_empty() {
        println!("📭 No campaigns registered yet");
        return;
    }

    println!("📋 Campaigns ({} total)", campaigns.len());
    println!("┌──────────────────────┬────────────┬────────────┬──────────────────────────────────────────┐");
    println!("│ Name                 │ Target     │ Send date  │ Message                                  │");
    println!("├──────────────────────┼────────────┼────────────┼──────────────────────────────────────────┤");
    for campaign in campaigns {
        println!(
            "│ {:<20} │ {:<10} │ {} │ {:<40} │",
            truncate_string(&campaign.name, 20),
            truncate_string(&campaign.target_bucket, 10),
            campaign.send_date,
            truncate_string(&campaign.message, 40)
        );
    }
    println!("└──────────────────────┴────────────┴────────────┴──────────────────────────────────────────┘");
}

fn print_customers(customers: &[EnrichedCustomer]) {
    if customers.is_empty() {
        println!("📭 No customers match");
        return;
    }

    println!("┌──────────────────────┬─────────────────┬──────────────────────────┬────────────┬──────┬────────────┬────────┬──────────────────────────────┐");
    println!("│ Name                 │ Phone           │ Email                    │ Last order │ Days │ Bucket     │ Orders │ Campaign                     │");
    println!("├──────────────────────┼─────────────────┼──────────────────────────┼────────────┼──────┼────────────┼────────┼──────────────────────────────┤");
    for customer in customers {
        println!(
            "│ {:<20} │ {:<15} │ {:<24} │ {} │ {:>4} │ {:<10} │ {:>6} │ {:<28} │",
            truncate_string(&customer.name, 20),
            truncate_string(&customer.phone, 15),
            truncate_string(&customer.email, 24),
            customer.last_order_date,
            customer.days_since_last_order,
            customer.recency_bucket.label(),
            customer.order_count,
            truncate_string(customer.campaign_message.as_deref().unwrap_or(""), 28)
        );
    }
    println!("└──────────────────────┴─────────────────┴──────────────────────────┴────────────┴──────┴────────────┴────────┴──────────────────────────────┘");
    println!("  {} customers", customers.len());
}

fn show_stats(dashboard: &Dashboard, today: NaiveDate) {
    let summary = or_exit(dashboard.summary(today), "Failed to compute statistics");

    println!("📈 Customer Statistics as of {today}");
    println!("═══════════════════════════════════════");
    println!();
    println!("  Total Customers: {}", summary.total_customers);
    println!("  Total Orders: {}", summary.total_orders);
    println!("  Orders per Customer: {:.1}", summary.mean_orders);
    println!("  Mean Days Since Last Order: {:.1}", summary.mean_days_since_last_order);
    println!("  Customers With a Campaign: {}", summary.customers_with_campaign);
    println!();

    let widest = summary.distribution.iter().map(|c| c.customers).max().unwrap_or(0);

    println!("🍕 Distribution by Bucket:");
    for count in &summary.distribution {
        let bar_len = if widest > 0 { count.customers * 40 / widest } else { 0 };
        let pct = if summary.total_customers > 0 {
            count.customers as f64 / summary.total_customers as f64 * 100.0
        } else {
            0.0
        };
        println!(
            "  {:<10} │{:<40}│ {:>5} ({:.1}%)",
            count.bucket.label(),
            "█".repeat(bar_len),
            count.customers,
            pct
        );
    }
}

fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

use clap::Parser;

use concert_scrape::{AppConfig, Concert, ConcertService, FilterCriteria};

/// Lists upcoming concerts from the cached catalog, refreshing it when stale.
#[derive(Parser, Debug)]
#[command(name = "concert-scrape", version, about)]
struct Args {
    /// How many days ahead to scrape (defaults to the configured window)
    #[arg(long)]
    days: Option<u32>,

    /// Scrape even if the cache is still fresh
    #[arg(long)]
    refresh: bool,

    /// Case-insensitive artist substring
    #[arg(long)]
    artist: Option<String>,

    /// Case-insensitive venue substring
    #[arg(long)]
    venue: Option<String>,

    /// Earliest date, YYYY-MM-DD
    #[arg(long)]
    from: Option<String>,

    /// Latest date, YYYY-MM-DD
    #[arg(long)]
    to: Option<String>,

    /// Show at most this many concerts, 0 for all
    #[arg(long, default_value_t = 10)]
    limit: usize,

    /// Print JSON instead of one line per concert
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    concert_scrape::init_logging();
    let args = Args::parse();

    let config = AppConfig::load();
    let within_days = args.days.unwrap_or(config.within_days);
    let service = ConcertService::from_config(&config);

    let criteria = FilterCriteria {
        artist: args.artist,
        venue: args.venue,
        from_date: args.from,
        to_date: args.to,
    };
    let matched = service.query(within_days, args.refresh, &criteria);
    let concerts = limited(&matched, args.limit);

    if args.json {
        println!("{}", serde_json::to_string_pretty(concerts)?);
        return Ok(());
    }

    if concerts.is_empty() {
        println!("No concerts found.");
    }
    for concert in concerts {
        println!(
            "{}  {} @ {}",
            concert.date_key(),
            concert.artist(),
            concert.location()
        );
    }
    Ok(())
}

fn limited(concerts: &[Concert], limit: usize) -> &[Concert] {
    if limit == 0 {
        concerts
    } else {
        &concerts[..concerts.len().min(limit)]
    }
}

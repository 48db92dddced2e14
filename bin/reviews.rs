use anyhow::{anyhow, Context};
use clap::{Arg, ArgAction, Command};
use csv_reviews::contact::ContactLinks;
use csv_reviews::{
    fetch_reviews_from_csv, reader_from_path, reviews_from_reader, HttpFetcher, ReviewFeed,
    SiteConfig,
};
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let matches = Command::new("reviews")
        .about("Load reviews from the published sheet export (or a saved copy) and print them")
        .arg(Arg::new("url").long("url").help("CSV export URL (defaults to SITE_REVIEWS_CSV_URL)"))
        .arg(Arg::new("path").long("path").help("Saved export: .csv, .csv.gz or .csv.zst").value_parser(clap::value_parser!(PathBuf)).conflicts_with("url"))
        .arg(Arg::new("charset").long("charset").help("Charset of a saved export, e.g. windows-1252").default_value("utf-8"))
        .arg(Arg::new("limit").long("limit").help("Print at most N reviews").value_parser(clap::value_parser!(usize)))
        .arg(Arg::new("links").long("links").help("Also print the contact links from the site config").action(ArgAction::SetTrue))
        .get_matches();

    let config = SiteConfig::load()?;
    let start = Instant::now();

    let (source, feed): (String, ReviewFeed) =
        if let Some(path) = matches.get_one::<PathBuf>("path") {
            let label = matches.get_one::<String>("charset").map(String::as_str).unwrap_or("utf-8");
            let charset = encoding_rs::Encoding::for_label(label.as_bytes())
                .ok_or_else(|| anyhow!("unknown charset: {label}"))?;
            let (reader, _meta) = reader_from_path(path, charset).await?;
            (path.display().to_string(), reviews_from_reader(reader).await?)
        } else {
            let url = matches
                .get_one::<String>("url")
                .cloned()
                .or_else(|| config.reviews_csv_url.clone())
                .context("provide --url, --path or SITE_REVIEWS_CSV_URL")?;
            let feed = fetch_reviews_from_csv(&HttpFetcher::new(), &url).await?;
            (url, feed)
        };
    let elapsed = start.elapsed().as_secs_f64();

    let limit = matches.get_one::<usize>("limit").copied().unwrap_or(usize::MAX);
    for review in feed.reviews.iter().take(limit) {
        let place = review.city.as_deref().filter(|c| !c.is_empty()).unwrap_or("-");
        let service = review.service.as_deref().filter(|s| !s.is_empty()).unwrap_or("-");
        println!(
            "{}/5  {} ({place}, {service}): {}",
            review.rating, review.name, review.text
        );
    }
    if feed.reviews.is_empty() {
        println!("no reviews yet");
    }

    println!(
        "source={} rows={} reviews={} dropped={} average={:.1} crc=0x{:08x}\nelapsed={:.2}s",
        source,
        feed.row_count,
        feed.reviews.len(),
        feed.dropped,
        feed.average,
        feed.checksum,
        elapsed
    );

    if matches.get_flag("links") {
        let links = ContactLinks::from_config(&config);
        println!("tel={}\nmailto={}\nwhatsapp={}\nmap={}", links.tel, links.mailto, links.whatsapp, links.map_view);
    }
    Ok(())
}

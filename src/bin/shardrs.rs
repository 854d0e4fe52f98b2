//! shardrs demo binary - encode a payload, erase shards, reconstruct
//!
//! Walks one payload through split → encode → erase → verify → reconstruct → join
//! and prints every step.

use anyhow::{bail, Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use shardrs::{join, CodecConfig, ReedSolomon};

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false)
        .init();

    let matches = Command::new("shardrs")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Reed-Solomon erasure coding demo (split, encode, erase, reconstruct)")
        .arg(
            Arg::new("data")
                .short('d')
                .long("data")
                .help("Number of data shards")
                .value_name("COUNT")
                .default_value("4"),
        )
        .arg(
            Arg::new("parity")
                .short('p')
                .long("parity")
                .help("Number of parity shards")
                .value_name("COUNT")
                .default_value("2"),
        )
        .arg(
            Arg::new("payload")
                .long("payload")
                .help("Payload to encode")
                .value_name("TEXT")
                .default_value("HELLO_RS"),
        )
        .arg(
            Arg::new("erase")
                .short('e')
                .long("erase")
                .help("Comma-separated shard indices to erase")
                .value_name("INDICES")
                .default_value("1,4"),
        )
        .arg(
            Arg::new("matrix")
                .short('m')
                .long("matrix")
                .help("Generator matrix construction: cauchy or vandermonde")
                .value_name("KIND")
                .default_value("cauchy"),
        )
        .arg(
            Arg::new("threads")
                .short('t')
                .long("threads")
                .help("Number of threads for coding (0 = auto)")
                .value_name("COUNT"),
        )
        .arg(
            Arg::new("no-parallel")
                .long("no-parallel")
                .help("Code on a single thread")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    run(&matches)
}

fn parse_count(matches: &ArgMatches, name: &str) -> Result<usize> {
    let raw = matches
        .get_one::<String>(name)
        .with_context(|| format!("--{name} is required"))?;
    raw.parse()
        .with_context(|| format!("Invalid value for --{name}: {raw}"))
}

fn parse_erasures(raw: &str, total: usize) -> Result<Vec<usize>> {
    let mut indices = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let index: usize = part
            .parse()
            .with_context(|| format!("Invalid shard index: {part}"))?;
        if index >= total {
            bail!("Shard index {index} out of range (total shards: {total})");
        }
        indices.push(index);
    }
    Ok(indices)
}

fn run(matches: &ArgMatches) -> Result<()> {
    let data = parse_count(matches, "data")?;
    let parity = parse_count(matches, "parity")?;
    let payload = matches
        .get_one::<String>("payload")
        .map(String::as_bytes)
        .unwrap_or_default();
    let config = CodecConfig::from_args(matches).context("Invalid codec options")?;
    let rs = ReedSolomon::with_config(data, parity, config)
        .context("Failed to create Reed-Solomon codec")?;

    let mut shards = rs.split(payload).context("Failed to split payload")?;
    rs.encode(&mut shards).context("Failed to encode parity")?;

    println!(
        "Encoded {} bytes into {} data + {} parity shards of {} bytes",
        payload.len(),
        data,
        parity,
        shards.first().map_or(0, Vec::len)
    );
    for (index, shard) in shards.iter().enumerate() {
        let kind = if index < data { "data" } else { "parity" };
        println!("  shard {index:>3} ({kind:>6}): {}", hex::encode(shard));
    }

    let erase = matches
        .get_one::<String>("erase")
        .map(String::as_str)
        .unwrap_or_default();
    let erasures = parse_erasures(erase, rs.total_shard_count())?;

    let mut slots: Vec<Option<Vec<u8>>> = shards.into_iter().map(Some).collect();
    for &index in &erasures {
        slots[index] = None;
    }
    println!("Erased shards: {:?}", erasures);

    println!("Verify before reconstruct: {}", rs.verify(&slots)?);
    rs.reconstruct(&mut slots)
        .context("Failed to reconstruct shards")?;
    println!("Verify after reconstruct: {}", rs.verify(&slots)?);

    for &index in &erasures {
        if let Some(shard) = &slots[index] {
            println!("  restored shard {index:>3}: {}", hex::encode(shard));
        }
    }

    let joined = join(&slots, data, payload.len()).context("Failed to join shards")?;
    println!("Recovered payload: {}", String::from_utf8_lossy(&joined));
    Ok(())
}

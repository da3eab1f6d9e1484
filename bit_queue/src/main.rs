use anyhow::{ensure, Context, Result};
use bit_queue::BitQueue;
use clap::{ArgAction, Parser};
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
/// Drains runs of bits from a byte buffer through a bit queue.
struct Args {
    /// Bytes to wrap, as hex. Ignored when --write is used.
    #[arg(short, long, default_value = "aaaa")]
    bytes: String,

    /// Widths of the runs to read, in bits.
    #[arg(short, long, value_delimiter = ',', default_values_t = [8, 5, 1])]
    reads: Vec<usize>,

    /// Append a `value:width` run to an empty queue before reading. The
    /// value may be decimal or `0x` prefixed hex.
    #[arg(short, long, value_parser = parse_run)]
    write: Vec<Run>,

    /// Size in bytes of the queue used with --write.
    #[arg(short, long, default_value_t = 8)]
    capacity: usize,

    /// Log queue operations. Pass twice to log every read and write.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Run {
    value: u64,
    width: usize,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let filter = filter::Targets::new()
        .with_default(LevelFilter::OFF)
        .with_target("bit_queue", level)
        .with_target("common", level);
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    if args.write.is_empty() {
        let mut bytes = parse_hex(&args.bytes)?;
        let mut queue = BitQueue::from_buffer(&mut bytes[..])?;
        drain(&mut queue, &args.reads)?;
        queue.destroy()?;
        info!("Caller buffer after destroy: {}", hex(&bytes));
    } else {
        let mut queue = BitQueue::new(args.capacity)?;
        for run in &args.write {
            queue
                .write_value(run.value, run.width)
                .with_context(|| format!("Failed to append {} bits", run.width))?;
        }
        drain(&mut queue, &args.reads)?;
        queue.destroy()?;
    }

    Ok(())
}

fn drain<B>(queue: &mut BitQueue<B>, reads: &[usize]) -> Result<()>
where
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    for (i, &width) in reads.iter().enumerate() {
        let mut res = vec![0; width.div_ceil(8)];
        queue
            .read_bits(&mut res, width)
            .with_context(|| format!("Failed to read {width} bits"))?;

        if res.len() <= 8 {
            let mut value = [0; 8];
            value[..res.len()].copy_from_slice(&res);
            println!("m{} = {}", i + 1, u64::from_le_bytes(value));
        } else {
            println!("m{} = {}", i + 1, hex(&res));
        }
    }

    info!("{} bits left unread", queue.written_bits());
    Ok(())
}

fn parse_hex(input: &str) -> Result<Vec<u8>> {
    let digits = input
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .collect::<String>();
    let digits = digits.strip_prefix("0x").unwrap_or(&digits);
    ensure!(
        digits.is_ascii() && !digits.is_empty() && digits.len() % 2 == 0,
        "Expected an even number of hex digits, got `{input}`"
    );

    (0..digits.len())
        .step_by(2)
        .map(|i| {
            let pair = &digits[i..i + 2];
            u8::from_str_radix(pair, 16).with_context(|| format!("Invalid hex byte `{pair}`"))
        })
        .collect()
}

fn parse_run(input: &str) -> Result<Run> {
    let (value, width) = input
        .split_once(':')
        .context("Expected a run written as `value:width`")?;

    let value = match value.strip_prefix("0x") {
        Some(hex) => u64::from_str_radix(hex, 16)?,
        None => value.parse()?,
    };
    let width: usize = width.parse()?;
    ensure!(
        (1..=64).contains(&width),
        "Run width must be between 1 and 64 bits"
    );

    Ok(Run { value, width })
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|byte| format!("{byte:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_bytes() {
        assert_eq!(parse_hex("aaaa").unwrap(), [0xAA, 0xAA]);
        assert_eq!(parse_hex("0x12 34,56").unwrap(), [0x12, 0x34, 0x56]);
        assert!(parse_hex("abc").is_err());
        assert!(parse_hex("zz").is_err());
        assert!(parse_hex("").is_err());
        assert_eq!(hex(&[0x0A, 0xFF]), "0aff");
    }

    #[test]
    fn runs() {
        assert_eq!(
            parse_run("0x1f:5").unwrap(),
            Run {
                value: 0x1F,
                width: 5
            }
        );
        assert_eq!(parse_run("10:4").unwrap(), Run { value: 10, width: 4 });
        assert!(parse_run("10").is_err());
        assert!(parse_run("10:0").is_err());
        assert!(parse_run("10:65").is_err());
    }

    #[test]
    fn cli_defaults_match_demo() {
        let args = Args::try_parse_from(["bit_queue"]).unwrap();
        assert_eq!(args.reads, [8, 5, 1]);
        assert_eq!(parse_hex(&args.bytes).unwrap(), [0xAA, 0xAA]);
        assert!(args.write.is_empty());
    }
}

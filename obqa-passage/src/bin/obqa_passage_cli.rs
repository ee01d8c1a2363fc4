use clap::Parser;
use obqa_passage::{
    Chunker, Combiner, RegexSegmenter, SentenceSegmenter, clean_text,
};
use std::fs;
use std::io::{self, Read};

/// A CLI tool to break raw text into token-budgeted passages as JSON.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the input text file. If not provided, reads from stdin.
    #[arg(short, long)]
    input: Option<String>,

    /// Target token count for each passage.
    #[arg(short, long, default_value_t = Combiner::DEFAULT_TARGET)]
    target: usize,

    /// Ceiling multiplier applied to the target.
    #[arg(short, long, default_value_t = Combiner::DEFAULT_CEILING_MULTIPLIER)]
    ceiling_multiplier: f64,

    /// Worker count the chunker should partition for.
    #[arg(short, long, default_value_t = 4)]
    workers: usize,
}

fn main() -> io::Result<()> {
    let args = Args::parse();

    let raw = if let Some(input_path) = args.input {
        fs::read_to_string(input_path)?
    } else {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    };

    let text = clean_text(&raw);
    let sentences = RegexSegmenter::new().segment(&text);

    let chunker = Chunker::new(args.workers);
    let combiner = Combiner::with_ceiling_multiplier(args.target, args.ceiling_multiplier);

    let passages: Vec<_> = chunker
        .chunk(&sentences)
        .iter()
        .flat_map(|chunk| combiner.combine(&chunk.sentences))
        .collect();

    let json_output = serde_json::to_string_pretty(&passages)?;
    println!("{}", json_output);

    Ok(())
}

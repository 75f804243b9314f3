use clap::Parser;
use packtree::{sizing, GridSteps, Region};

/// Feasibility sweep: which (area, ratio) requests succeed on a fresh
/// root, and with what shape. Each verdict is double-checked against a
/// brute-force scan of every admissible rectangle.
#[derive(Parser, Debug)]
struct Arg {
    /// Width of the root region
    #[arg(long, default_value_t = 10)]
    width:  usize,

    /// Height of the root region
    #[arg(long, default_value_t = 10)]
    height: usize,

    /// Number of ratio steps between 0 and 1
    #[arg(long, default_value_t = 4)]
    steps:  usize,
}

fn main() {
    let cli = Arg::parse();

    print!("area");
    for k in 0..=cli.steps {
        print!("   r={:.2}", k as f64 / cli.steps as f64);
    }
    println!();

    for area in 1..=cli.width * cli.height {
        print!("{area:>4}");
        for k in 0..=cli.steps {
            let ratio = k as f64 / cli.steps as f64;
            let mut tree = Region::new(0, 0, cli.width, cli.height);
            match tree.alloc_area(area, ratio, None) {
                Some((_, _, w, h)) => {
                    assert!(w * h >= area);
                    assert!(sizing::aspect_ratio(w, h) >= ratio);
                    assert!(feasible(area, cli.width, cli.height, ratio));
                    print!("  {w:>2}x{h:<3}");
                }
                None => {
                    assert!(!feasible(area, cli.width, cli.height, ratio));
                    print!("    -   ");
                }
            }
        }
        println!();
    }
}

/// Does any rectangle within the bounds cover the area at this
/// squareness? The slow, obviously-correct counterpart to what the
/// allocator decides.
fn feasible(area: GridSteps, bw: GridSteps, bh: GridSteps, ratio: f64) -> bool {
    (1..=bw).any(|w| (1..=bh).any(|h| w * h >= area && sizing::aspect_ratio(w, h) >= ratio))
}

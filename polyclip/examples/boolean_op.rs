use std::{path::PathBuf, str::FromStr};

use clap::Parser;
use polyclip::{
    BooleanOp, ClipConfig, ClipStatus, Polygon, PolygonClipper, Precision, Reconstruction,
};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

#[derive(Copy, Clone, Debug)]
struct Op(BooleanOp);

impl FromStr for Op {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "union" => Ok(Op(BooleanOp::Union)),
            "intersection" => Ok(Op(BooleanOp::Intersection)),
            "difference" => Ok(Op(BooleanOp::Difference)),
            "xor" => Ok(Op(BooleanOp::Xor)),
            _ => Err(format!("unknown op {s}")),
        }
    }
}

/// Reads two polygons from a JSON file, combines them, and draws the result as SVG.
///
/// The input looks like `{"subject": [[{"x": 0, "y": 0}, ...], ...], "clipping": ...}`,
/// optionally with a `"config"` object.
#[derive(Parser)]
struct Args {
    input: PathBuf,
    output: PathBuf,

    #[arg(long)]
    op: Op,

    /// Overrides the precision in the input's config.
    #[arg(long)]
    epsilon: Option<f64>,

    /// Fall back to the largest open chain if nothing closes up.
    #[arg(long)]
    best_effort: bool,
}

#[derive(Deserialize)]
struct Input {
    subject: Polygon,
    clipping: Polygon,
    #[serde(default)]
    config: ClipConfig,
}

fn path(polygon: &Polygon, fill: &str, opacity: f64) -> svg::node::element::Path {
    let mut data = svg::node::element::path::Data::new();
    for contour in polygon.contours() {
        let mut points = contour.points().iter();
        let Some(p) = points.next() else {
            continue;
        };
        data = data.move_to((p.x, p.y));
        for p in points {
            data = data.line_to((p.x, p.y));
        }
        data = data.close();
    }
    svg::node::element::Path::new()
        .set("d", data)
        .set("fill", fill)
        .set("fill-opacity", opacity)
        .set("fill-rule", "evenodd")
}

pub fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let args = Args::parse();

    let input: Input = serde_json::from_str(&std::fs::read_to_string(&args.input)?)?;
    let mut config = input.config;
    if let Some(eps) = args.epsilon {
        config = config.with_precision(Precision::Fixed(eps));
    }
    if args.best_effort {
        config = config.with_reconstruction(Reconstruction::BestEffort);
    }

    let out = PolygonClipper::new(&input.subject, &input.clipping)
        .with_config(config)
        .compute(args.op.0)?;
    match out.status {
        ClipStatus::Exact => println!("exact"),
        ClipStatus::OpenChainsDropped(n) => println!("dropped {n} open chains"),
        ClipStatus::LargestStrip => println!("approximated by the largest strip"),
        ClipStatus::Truncated { iterations } => {
            println!("gave up after {iterations} iterations")
        }
    }

    let Some(bbox) = input
        .subject
        .bounding_box()
        .into_iter()
        .chain(input.clipping.bounding_box())
        .reduce(|a, b| a.union(&b))
    else {
        anyhow::bail!("both inputs are empty");
    };
    let pad = 0.05 * bbox.width.max(bbox.height).max(1e-6);
    let mut document = svg::Document::new().set(
        "viewBox",
        (
            bbox.min_x - pad,
            bbox.min_y - pad,
            bbox.width + 2.0 * pad,
            bbox.height + 2.0 * pad,
        ),
    );

    document = document
        .add(path(&input.subject, "red", 0.2))
        .add(path(&input.clipping, "blue", 0.2));
    if let Some(result) = &out.polygon {
        println!("{} contours, area {}", result.len(), result.area());
        document = document.add(path(result, "black", 0.8));
    } else {
        println!("empty result");
    }

    svg::save(&args.output, &document)?;

    Ok(())
}

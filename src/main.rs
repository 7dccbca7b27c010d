use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use env_logger::{Builder, Env};
use log::info;

use edgematch::solver::{self, Options};
use edgematch::{BoardType, PieceSet};

/// Exhaustive solver for edge matching puzzles.
#[derive(Parser)]
#[command(name = "edgematch", version, about)]
struct Cli {
    /// Board width.
    #[arg(required_unless_present = "validate")]
    width: Option<usize>,

    /// Board height.
    #[arg(required_unless_present = "validate")]
    height: Option<usize>,

    /// Pieces file: one piece per line as left, top, right, bottom edge
    /// colors; lines starting with `/` are comments.
    #[arg(required_unless_present = "validate")]
    pieces: Option<PathBuf>,

    /// Run the validation suite.
    #[arg(long)]
    validate: bool,

    /// Use 1x2 and 2x1 tiles and smaller.
    #[arg(long = "u2")]
    use_2: bool,

    /// Use 2x2 tiles and smaller.
    #[arg(long = "u4")]
    use_4: bool,

    /// Use 2x4 and 4x2 tiles and smaller.
    #[arg(long = "u8")]
    use_8: bool,

    /// Use 4x4 tiles and smaller.
    #[arg(long = "u16")]
    use_16: bool,

    /// Use 4x8 and 8x4 tiles and smaller.
    #[arg(long = "u32")]
    use_32: bool,

    /// Solve a normal board (all edges are borders).
    #[arg(long = "bt0")]
    bt0: bool,

    /// Solve for the bottom left corner only.
    #[arg(long = "bt1")]
    bt1: bool,

    /// Solve for the bottom edge only.
    #[arg(long = "bt2")]
    bt2: bool,

    /// Solve for the bottom right corner only.
    #[arg(long = "bt3")]
    bt3: bool,

    /// Solve for the left edge only.
    #[arg(long = "bt4")]
    bt4: bool,

    /// Solve a board with no borders.
    #[arg(long = "bt5")]
    bt5: bool,

    /// Solve for the right edge only.
    #[arg(long = "bt6")]
    bt6: bool,

    /// Solve for the top left corner only.
    #[arg(long = "bt7")]
    bt7: bool,

    /// Solve for the top edge only.
    #[arg(long = "bt8")]
    bt8: bool,

    /// Solve for the top right corner only.
    #[arg(long = "bt9")]
    bt9: bool,

    /// Print solutions.
    #[arg(short = 'p')]
    print: bool,

    /// Quit after the first solution found.
    #[arg(short = 'q')]
    quit: bool,

    /// Randomize tile order before solving.
    #[arg(short = 'r')]
    randomize: bool,

    /// Use threaded solving.
    #[arg(short = 't')]
    threaded: bool,
}

impl Cli {
    fn max_tile_area(&self) -> usize {
        if self.use_2 {
            2
        } else if self.use_4 {
            4
        } else if self.use_8 {
            8
        } else if self.use_16 {
            16
        } else if self.use_32 {
            32
        } else {
            1
        }
    }

    /// Board type flags follow the number pad: 7 8 9 across the top, 4 5 6
    /// through the middle, 1 2 3 along the bottom, with 5 the borderless
    /// middle.
    fn board_type(&self) -> BoardType {
        if self.bt7 {
            BoardType::TOP_LEFT_CORNER
        } else if self.bt8 {
            BoardType::TOP_EDGE
        } else if self.bt9 {
            BoardType::TOP_RIGHT_CORNER
        } else if self.bt4 {
            BoardType::LEFT_EDGE
        } else if self.bt5 {
            BoardType::MIDDLE
        } else if self.bt6 {
            BoardType::RIGHT_EDGE
        } else if self.bt1 {
            BoardType::BOTTOM_LEFT_CORNER
        } else if self.bt2 {
            BoardType::BOTTOM_EDGE
        } else if self.bt3 {
            BoardType::BOTTOM_RIGHT_CORNER
        } else {
            BoardType::NORMAL
        }
    }
}

fn main() -> ExitCode {
    let mut builder = Builder::from_env(Env::default().default_filter_or("info"));
    builder.target(env_logger::Target::Stdout);
    builder.format_timestamp_millis();
    builder.init();

    let cli = Cli::parse();

    if cli.validate {
        info!("running validation suite...");
        return if edgematch::validate::run() {
            info!("success");
            ExitCode::SUCCESS
        } else {
            eprintln!("validation FAILED");
            ExitCode::FAILURE
        };
    }

    let (Some(width), Some(height), Some(path)) = (cli.width, cli.height, cli.pieces.as_ref())
    else {
        // clap enforces these whenever --validate is absent
        return ExitCode::from(2);
    };

    if width < 2 || height < 2 {
        eprintln!("invalid board size: {}x{}", width, height);
        return ExitCode::from(2);
    }

    let pieces = match PieceSet::load(path) {
        Ok(pieces) => pieces,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(3);
        }
    };
    info!("loaded {} pieces", pieces.len());

    let opts = Options {
        width,
        height,
        max_tile_area: cli.max_tile_area(),
        board_type: cli.board_type(),
        print: cli.print,
        quit: cli.quit,
        randomize: cli.randomize,
        threaded: cli.threaded,
    };

    match solver::solve(&pieces, &opts) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::from(4)
        }
    }
}

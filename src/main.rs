//! Planetmap CLI - fractal planet map generator.
//!
//! Renders a planet built by recursive tetrahedron subdivision through one
//! of ten map projections and writes it as PNG, JPEG or GIF.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

use planetmap::config::{ConfigError, OutlineMode, Projection, RenderConfig, ShadeMode, Variant};
use planetmap::export::{
    export_altitude_png, export_altitude_raw, save_map, AltitudePngOptions, RawFormat,
};
use planetmap::Renderer;

/// Fractal planet map generator.
#[derive(Parser)]
#[command(name = "planetmap")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a planet map.
    Render {
        #[command(flatten)]
        options: MapOptions,

        /// Output image; the extension selects PNG, JPEG or GIF.
        #[arg(short, long, default_value = "planet.png")]
        output: PathBuf,

        /// Also write the altitudes as a 16-bit grayscale PNG.
        #[arg(long)]
        heightmap: Option<PathBuf>,

        /// Also write the altitudes as a RAW heightfield.
        #[arg(long)]
        raw: Option<PathBuf>,

        /// Sample layout of the RAW heightfield.
        #[arg(long, default_value = "r16")]
        raw_format: RawFormat,

        /// Write the effective configuration as JSON (reproduces the map).
        #[arg(long)]
        save_config: Option<PathBuf>,
    },

    /// Display the resolved parameters of a configuration without rendering.
    Info {
        #[command(flatten)]
        options: MapOptions,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Preset {
    /// Whole-world square map with atlas colours and a 30° grid.
    Atlas,
    /// Shaded orthographic globe with extended colours.
    Globe,
}

/// Map options. Unset flags keep the value from `--config`, `--preset` or
/// the defaults, in that order.
#[derive(Args)]
struct MapOptions {
    /// JSON configuration to start from.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Named starting configuration (ignored with --config).
    #[arg(long)]
    preset: Option<Preset>,

    /// Planet seed; random when omitted.
    #[arg(short, long, allow_negative_numbers = true)]
    seed: Option<f64>,

    /// Image width in pixels.
    #[arg(short = 'w', long)]
    width: Option<u32>,

    /// Image height in pixels.
    #[arg(short = 'H', long)]
    height: Option<u32>,

    /// Magnification.
    #[arg(short = 'm', long)]
    scale: Option<f64>,

    /// Longitude of the view centre in degrees.
    #[arg(short = 'l', long, allow_negative_numbers = true)]
    longitude: Option<f64>,

    /// Latitude of the view centre in degrees.
    #[arg(short = 'L', long, allow_negative_numbers = true)]
    latitude: Option<f64>,

    /// Projection: a selector letter (m p q M S s o g a c) or a name.
    #[arg(short, long)]
    projection: Option<Projection>,

    /// Generation rules.
    #[arg(long)]
    variant: Option<Variant>,

    /// Altitude of the outer tetrahedron's vertices.
    #[arg(short = 'i', long, allow_negative_numbers = true)]
    initial_altitude: Option<f64>,

    /// Weight of the altitude difference term.
    #[arg(long)]
    altitude_weight: Option<f64>,

    /// Weight of the edge length term.
    #[arg(long)]
    distance_weight: Option<f64>,

    /// Colour table size.
    #[arg(long)]
    colors: Option<u32>,

    /// Atlas-style colours (classic variant only).
    #[arg(long)]
    alt_colors: bool,

    /// Number of lightening passes over the key colours.
    #[arg(long)]
    lighter: Option<u32>,

    /// Push icecaps toward the poles.
    #[arg(long)]
    latitude_colors: bool,

    /// Coastline outlines.
    #[arg(long)]
    outline: Option<OutlineMode>,

    /// Contour line spacing in colour indices (0 = coastline only).
    #[arg(long)]
    contour_step: Option<u32>,

    /// Shading mode.
    #[arg(long)]
    shading: Option<ShadeMode>,

    /// Light direction in degrees.
    #[arg(long, allow_negative_numbers = true)]
    shade_angle: Option<f64>,

    /// Light elevation in degrees (daylight shading).
    #[arg(long, allow_negative_numbers = true)]
    shade_angle2: Option<f64>,

    /// Spacing of latitude lines in degrees.
    #[arg(long)]
    hgrid: Option<f64>,

    /// Spacing of longitude lines in degrees.
    #[arg(long)]
    vgrid: Option<f64>,

    /// Fixed subdivision depth for every pixel.
    #[arg(long)]
    depth: Option<u32>,

    /// Render on a single thread.
    #[arg(long)]
    sequential: bool,
}

impl MapOptions {
    /// Builds the effective configuration.
    fn build(&self) -> Result<RenderConfig, ConfigError> {
        let mut config = match (&self.config, self.preset) {
            (Some(path), _) => RenderConfig::load(path)?,
            (None, Some(Preset::Atlas)) => RenderConfig::world_atlas(0.0),
            (None, Some(Preset::Globe)) => RenderConfig::globe(0.0),
            (None, None) => RenderConfig::default(),
        };
        match self.seed {
            Some(seed) => config.seed = seed,
            None if self.config.is_none() => config.seed = rand::random::<f64>(),
            None => {}
        }

        macro_rules! overlay {
            ($($flag:expr => $field:ident),* $(,)?) => {
                $(if let Some(v) = $flag { config.$field = v; })*
            };
        }
        overlay!(
            self.width => width,
            self.height => height,
            self.scale => scale,
            self.longitude => longitude_deg,
            self.latitude => latitude_deg,
            self.projection => projection,
            self.variant => variant,
            self.initial_altitude => initial_altitude,
            self.lighter => lighter,
            self.outline => outline,
            self.contour_step => contour_step,
            self.shading => shading,
            self.shade_angle => shade_angle,
            self.shade_angle2 => shade_angle2,
            self.hgrid => hgrid,
            self.vgrid => vgrid,
        );
        if self.altitude_weight.is_some() {
            config.altitude_weight = self.altitude_weight;
        }
        if self.distance_weight.is_some() {
            config.distance_weight = self.distance_weight;
        }
        if self.colors.is_some() {
            config.color_count = self.colors;
        }
        if self.depth.is_some() {
            config.depth = self.depth;
        }
        config.alt_colors |= self.alt_colors;
        config.latitude_colors |= self.latitude_colors;
        if self.sequential {
            config.parallel = false;
        }
        Ok(config)
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            options,
            output,
            heightmap,
            raw,
            raw_format,
            save_config,
        } => {
            let config = build_config(&options);
            run_render(&config, &output, heightmap.as_deref(), raw.as_deref(), raw_format, save_config.as_deref());
        }
        Commands::Info { options } => {
            let config = build_config(&options);
            run_info(&config);
        }
    }
}

fn build_config(options: &MapOptions) -> RenderConfig {
    options.build().unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    })
}

fn configure(config: &RenderConfig) -> Renderer {
    Renderer::configure(config).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    })
}

fn run_render(
    config: &RenderConfig,
    output: &Path,
    heightmap: Option<&Path>,
    raw: Option<&Path>,
    raw_format: RawFormat,
    save_config: Option<&Path>,
) {
    let mut renderer = configure(config);
    let resolved = renderer.config().clone();

    println!("Planetmap - Fractal Planet Generator");
    println!("====================================");
    println!("Seed: {}", resolved.seed);
    println!("Size: {}x{}", resolved.width, resolved.height);
    println!("Projection: {} (scale {})", resolved.projection, resolved.scale);
    println!(
        "View centre: {:.2}° lon, {:.2}° lat",
        resolved.longitude.to_degrees(),
        resolved.latitude.to_degrees()
    );
    println!("Output: {}", output.display());

    let start = Instant::now();
    println!("\nRendering...");
    let map = renderer.render();
    let (min_alt, max_alt) = map.altitude_range();
    println!("Rendered in {:.2?}", start.elapsed());
    println!("Altitude range: [{:.4}, {:.4}]", min_alt, max_alt);

    println!("\nExporting...");
    let export_start = Instant::now();
    let image = renderer.to_rgb_image();
    match save_map(output, &image) {
        Ok(format) => println!("  Map ({:?}): {}", format, output.display()),
        Err(e) => {
            eprintln!("Error saving map: {}", e);
            std::process::exit(1);
        }
    }

    let map = renderer.buffers();
    if let Some(path) = heightmap {
        let options = AltitudePngOptions::auto_range(map);
        if let Err(e) = export_altitude_png(&map.altitude, map.width, map.height, path, &options) {
            eprintln!("Error exporting heightmap: {}", e);
            std::process::exit(1);
        }
        println!("  Heightmap (16-bit PNG): {}", path.display());
    }

    if let Some(path) = raw {
        if let Err(e) = export_altitude_raw(&map.altitude, map.width, map.height, path, raw_format, min_alt, max_alt) {
            eprintln!("Error exporting RAW: {}", e);
            std::process::exit(1);
        }
        println!("  RAW ({:?}): {}", raw_format, path.display());
    }

    if let Some(path) = save_config {
        let mut saved = config.clone();
        saved.seed = resolved.seed;
        if let Err(e) = saved.save(path) {
            eprintln!("Error saving configuration: {}", e);
            std::process::exit(1);
        }
        println!("  Configuration: {}", path.display());
    }

    println!("Export completed in {:.2?}", export_start.elapsed());
    println!("\nTotal time: {:.2?}", start.elapsed());
    println!("Done!");
}

fn run_info(config: &RenderConfig) {
    let renderer = configure(config);
    let resolved = renderer.config();
    let bands = renderer.color_table().bands();
    let projection = renderer.projection();
    let pixels = resolved.width as u64 * resolved.height as u64;
    let bytes = renderer.buffers().memory_bytes() as u64;
    let mb = |b: u64| b as f64 / 1024.0 / 1024.0;

    println!("Planetmap - Configuration Info");
    println!("==============================");
    println!();
    println!("Seed:        {}", resolved.seed);
    println!("Variant:     {:?}", resolved.variant);
    println!("Projection:  {} ('{}')", resolved.projection, resolved.projection.selector());
    println!("Size:        {}x{} ({} pixels)", resolved.width, resolved.height, pixels);
    println!("Scale:       {}", resolved.scale);
    println!(
        "View centre: {:.2}° lon, {:.2}° lat",
        resolved.longitude.to_degrees(),
        resolved.latitude.to_degrees()
    );
    println!();
    println!("Subdivision depth:");
    println!("  Base:       {}", resolved.depth);
    println!("  Top row:    {}", projection.depth(0));
    println!("  Centre row: {}", projection.depth(resolved.height / 2));
    println!();
    println!("Colour table: {} entries", renderer.color_table().len());
    let (sea_lo, sea_hi) = bands.sea_range();
    println!("  Sea:        {}..={}", sea_lo, sea_hi);
    println!("  Land:       {}..={}", bands.land_start(), bands.count - 1);
    println!("  Background: {}", bands.background);
    println!("  Grid:       {}", bands.grid);
    println!();
    println!("Memory usage (in-memory):");
    println!("  Buffers:    {:>12} bytes ({:.2} MB)", bytes, mb(bytes));
    println!();
    println!("Export file sizes (uncompressed):");
    println!("  RGB map:    {:>12} bytes ({:.2} MB)", pixels * 3, mb(pixels * 3));
    for format in [RawFormat::R16, RawFormat::R32] {
        let size = format.file_size(resolved.width, resolved.height);
        println!("  RAW {:?}:    {:>12} bytes ({:.2} MB)", format, size, mb(size));
    }
}

//! Meshbridge CLI - exercises the flat/topological converters on procedural meshes.
//!
//! Usage: meshbridge <COMMAND> [OPTIONS]
//!
//! Run `meshbridge --help` for available commands.

use std::io::Write;
use std::time::Instant;

use clap::{Parser, Subcommand, ValueEnum};
use nalgebra::Point3;

use meshbridge::convert::progress::Progress;
use meshbridge::convert::{
    read_flat_mesh_with_progress, write_flat_mesh_with_progress, ReadOptions, TessellationMethod,
    WriteOptions,
};
use meshbridge::flat::{build_flat_mesh, FlatMesh};
use meshbridge::mesh::TopoMesh;

#[derive(Parser)]
#[command(name = "meshbridge")]
#[command(author, version, about = "Flat/topological mesh conversion CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display topology statistics of a procedural mesh
    Info {
        /// Shape to build
        #[arg(short, long, value_enum, default_value = "grid")]
        shape: Shape,

        /// Shape resolution (grid cells per side, or polygon corners)
        #[arg(short = 'n', long, default_value = "4")]
        size: usize,
    },

    /// Convert flat -> topological -> flat twice and compare
    Roundtrip {
        /// Shape to build
        #[arg(short, long, value_enum, default_value = "grid")]
        shape: Shape,

        /// Shape resolution (grid cells per side, or polygon corners)
        #[arg(short = 'n', long, default_value = "4")]
        size: usize,

        /// Tessellation used for the legacy face array
        #[arg(short, long, value_enum, default_value = "fan")]
        tessellation: Tessellation,

        /// Validate the flat mesh before reading
        #[arg(long)]
        validate: bool,

        /// Use single-threaded execution (for benchmarking)
        #[arg(long)]
        sequential: bool,

        /// Show a progress bar
        #[arg(long)]
        progress: bool,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Shape {
    /// Square grid of quads
    Grid,
    /// A single regular n-gon
    Ngon,
    /// Prism with n-gon caps and quad sides
    Prism,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Tessellation {
    /// Fan from the first corner
    Fan,
    /// Ear clipping (handles concave faces)
    EarClip,
}

impl From<Tessellation> for TessellationMethod {
    fn from(t: Tessellation) -> Self {
        match t {
            Tessellation::Fan => TessellationMethod::Fan,
            Tessellation::EarClip => TessellationMethod::EarClip,
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Info { shape, size } => {
            cmd_info(shape, size)?;
        }

        Commands::Roundtrip {
            shape,
            size,
            tessellation,
            validate,
            sequential,
            progress,
        } => {
            cmd_roundtrip(shape, size, tessellation, validate, sequential, progress)?;
        }
    }

    Ok(())
}

/// Create a progress reporter that prints one line per finished step.
fn create_progress() -> Progress {
    Progress::new(move |current, total, message| {
        if total == 0 {
            return;
        }
        eprint!("\r[{}/{}] {:<16}", current, total, message);
        let _ = std::io::stderr().flush();
        if current >= total {
            eprintln!();
        }
    })
}

fn build_shape(shape: Shape, size: usize) -> Result<FlatMesh, Box<dyn std::error::Error>> {
    let mut positions = Vec::new();
    let mut polygons: Vec<Vec<usize>> = Vec::new();

    match shape {
        Shape::Grid => {
            let n = size.max(1);
            for y in 0..=n {
                for x in 0..=n {
                    positions.push(Point3::new(x as f32, y as f32, 0.0));
                }
            }
            for y in 0..n {
                for x in 0..n {
                    let i = y * (n + 1) + x;
                    polygons.push(vec![i, i + 1, i + n + 2, i + n + 1]);
                }
            }
        }
        Shape::Ngon | Shape::Prism => {
            let n = size.max(3);
            let layers: &[f32] = if shape == Shape::Prism { &[0.0, 1.0] } else { &[0.0] };
            for &z in layers {
                for i in 0..n {
                    let t = i as f32 / n as f32 * std::f32::consts::TAU;
                    positions.push(Point3::new(t.cos(), t.sin(), z));
                }
            }
            if shape == Shape::Prism {
                polygons.push((0..n).rev().collect());
                polygons.push((n..2 * n).collect());
                for i in 0..n {
                    let j = (i + 1) % n;
                    polygons.push(vec![i, j, j + n, i + n]);
                }
            } else {
                polygons.push((0..n).collect());
            }
        }
    }

    Ok(build_flat_mesh(&positions, &polygons)?)
}

fn cmd_info(shape: Shape, size: usize) -> Result<(), Box<dyn std::error::Error>> {
    let flat = build_shape(shape, size)?;
    let mesh: TopoMesh = meshbridge::convert::flat_to_topo(&flat, &ReadOptions::validated())?;

    println!("Vertices: {}", mesh.num_vertices());
    println!("Edges: {}", mesh.num_edges());
    println!("Faces: {}", mesh.num_faces());
    println!("Loops: {}", mesh.num_loops());

    let sizes: Vec<usize> = mesh.face_ids().map(|f| mesh.face_len(f)).collect();
    if let (Some(min), Some(max)) = (sizes.iter().min(), sizes.iter().max()) {
        println!("Face size range: [{}, {}]", min, max);
    }

    let boundary = mesh
        .edge_ids()
        .filter(|&e| mesh.edge_faces(e).count() == 1)
        .count();
    if boundary == 0 {
        println!("Topology: Closed (no boundary)");
    } else {
        println!("Topology: Open ({} boundary edges)", boundary);
    }

    let euler = mesh.num_vertices() as i64 - mesh.num_edges() as i64 + mesh.num_faces() as i64;
    println!("Euler characteristic: {}", euler);

    Ok(())
}

fn cmd_roundtrip(
    shape: Shape,
    size: usize,
    tessellation: Tessellation,
    validate: bool,
    sequential: bool,
    show_progress: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let flat = build_shape(shape, size)?;
    println!(
        "Built: {} vertices, {} edges, {} polygons",
        flat.verts.len(),
        flat.edges.len(),
        flat.polys.len()
    );

    let read_options = ReadOptions::default().with_validate(validate);
    let write_options = WriteOptions::default()
        .with_tessellation(tessellation.into())
        .with_parallel(!sequential);
    let progress = if show_progress {
        create_progress()
    } else {
        Progress::none()
    };

    let start = Instant::now();
    let mut outputs = Vec::with_capacity(2);
    for _ in 0..2 {
        let mut mesh: TopoMesh = TopoMesh::new();
        read_flat_mesh_with_progress(&flat, &mut mesh, &read_options, &progress)?;
        let mut out = FlatMesh::new();
        write_flat_mesh_with_progress(&mesh, &mut out, &write_options, &progress)?;
        outputs.push(out);
    }
    let elapsed = start.elapsed();

    let out = &outputs[0];
    out.validate()?;
    println!(
        "Written: {} vertices, {} edges, {} legacy faces, {} polygons, {} loops",
        out.verts.len(),
        out.edges.len(),
        out.faces.len(),
        out.polys.len(),
        out.loops.len()
    );
    println!("Idempotent: {}", if outputs[0] == outputs[1] { "yes" } else { "no" });
    println!("Time: {:.2?}", elapsed);

    Ok(())
}

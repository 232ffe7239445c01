//! meshdiv CLI - subdivide and convert polygon meshes.
//!
//! Usage: meshdiv <COMMAND> [OPTIONS] <INPUT> [OUTPUT]
//!
//! Run `meshdiv --help` for available commands. Set `RUST_LOG=debug` to see
//! per-pass statistics.

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand, ValueEnum};

use meshdiv::algo::normals::compute_normals;
use meshdiv::algo::subdivide::{self, SubdivideOptions};
use meshdiv::io;
use meshdiv::mesh::HalfEdgeMesh;

#[derive(Parser)]
#[command(name = "meshdiv")]
#[command(author, version, about = "Polygon mesh subdivision CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display mesh information
    Info {
        /// Input mesh file (.obj or .off)
        input: PathBuf,
    },

    /// Subdivide a mesh
    Subdivide {
        /// Input mesh file
        input: PathBuf,

        /// Output mesh file
        output: PathBuf,

        /// Subdivision method
        #[arg(short, long, value_enum, default_value = "loop")]
        method: SubdivideMethod,

        /// Number of subdivision iterations
        #[arg(short, long, default_value = "1")]
        iterations: usize,

        /// Use single-threaded execution (for benchmarking)
        #[arg(long)]
        sequential: bool,
    },

    /// Convert between OBJ and OFF
    Convert {
        /// Input mesh file
        input: PathBuf,

        /// Output mesh file
        output: PathBuf,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum SubdivideMethod {
    /// Loop subdivision (for triangle meshes)
    Loop,
    /// Catmull-Clark subdivision (for any polygon mesh)
    CatmullClark,
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
        Commands::Info { input } => {
            cmd_info(&input)?;
        }

        Commands::Subdivide {
            input,
            output,
            method,
            iterations,
            sequential,
        } => {
            cmd_subdivide(&input, &output, method, iterations, sequential)?;
        }

        Commands::Convert { input, output } => {
            cmd_convert(&input, &output)?;
        }
    }

    Ok(())
}

fn cmd_info(input: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let mut mesh: HalfEdgeMesh = io::load(input)?;
    compute_normals(&mut mesh);

    println!("File: {}", input.display());
    println!("Vertices: {}", mesh.num_vertices());
    println!("Edges: {}", mesh.num_edges());
    println!("Faces: {}", mesh.num_faces());
    println!("Half-edges: {}", mesh.num_halfedges());
    println!("Euler characteristic: {}", mesh.euler_characteristic());

    if let Some((min, max)) = mesh.bounding_box() {
        println!(
            "Bounding box: ({:.3}, {:.3}, {:.3}) to ({:.3}, {:.3}, {:.3})",
            min.x, min.y, min.z, max.x, max.y, max.z
        );
        let diag = max - min;
        println!("Dimensions: {:.3} x {:.3} x {:.3}", diag.x, diag.y, diag.z);
    }

    if mesh.is_triangle_mesh() {
        println!("Mesh type: Triangle mesh");
    } else if mesh.is_quad_mesh() {
        println!("Mesh type: Quad mesh");
    } else {
        println!("Mesh type: Mixed polygon mesh");
    }

    let max_degree = mesh.face_ids().map(|f| mesh.face_degree(f)).max().unwrap_or(0);
    let max_valence = mesh.vertex_ids().map(|v| mesh.valence(v)).max().unwrap_or(0);
    println!("Max face degree: {}", max_degree);
    println!("Max vertex valence: {}", max_valence);

    let boundary_edges = mesh.edge_ids().filter(|&e| mesh.is_boundary_edge(e)).count();
    if boundary_edges == 0 {
        println!("Topology: Closed (no boundary)");
    } else {
        println!("Topology: Open ({} boundary edges)", boundary_edges);
    }

    let isolated = mesh.vertex_ids().filter(|&v| mesh.is_isolated(v)).count();
    if isolated > 0 {
        println!("Isolated vertices: {}", isolated);
    }

    if !mesh.is_valid() {
        println!("Warning: connectivity check failed");
    }

    Ok(())
}

fn cmd_subdivide(
    input: &PathBuf,
    output: &PathBuf,
    method: SubdivideMethod,
    iterations: usize,
    sequential: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mesh: HalfEdgeMesh = io::load(input)?;

    println!("Loaded: {} vertices, {} faces", mesh.num_vertices(), mesh.num_faces());

    let options = SubdivideOptions::new(iterations).with_parallel(!sequential);
    let mode = if sequential { "sequential" } else { "parallel" };

    let start = Instant::now();
    let refined = match method {
        SubdivideMethod::Loop => {
            println!("Applying Loop subdivision ({} iterations, {})...", iterations, mode);
            subdivide::loop_subdivide(&mesh, &options)?
        }
        SubdivideMethod::CatmullClark => {
            println!("Applying Catmull-Clark subdivision ({} iterations, {})...", iterations, mode);
            subdivide::catmull_clark_subdivide(&mesh, &options)?
        }
    };
    let elapsed = start.elapsed();

    println!("Result: {} vertices, {} faces", refined.num_vertices(), refined.num_faces());
    io::save(&refined, output)?;
    println!("Saved: {} ({:.2?})", output.display(), elapsed);

    Ok(())
}

fn cmd_convert(input: &PathBuf, output: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let mesh: HalfEdgeMesh = io::load(input)?;
    io::save(&mesh, output)?;
    println!(
        "Converted {} -> {} ({} vertices, {} faces)",
        input.display(),
        output.display(),
        mesh.num_vertices(),
        mesh.num_faces()
    );
    Ok(())
}

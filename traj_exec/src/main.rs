//! Trajectory generation executable entry point.
//!
//! Loads a path description from the parameters directory, profiles it,
//! optimises its waypoints and replays the result through the differential
//! drive simulation. All outputs are saved into the session directory.
//!
//! The parameter file defaults to `traj_gen.toml`, another file (relative to
//! the parameters directory) can be given as the only argument.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{debug, info};
use std::env;
use std::time::Instant;

// Internal
use traj_lib::{
    params::TrajGenParams,
    sim::DiffDriveSim,
    traj_builder::TrajBuilder,
};
use util::{
    logger::{logger_init, LevelFilter},
    maths::get_ang_dist,
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

const DEFAULT_PARAMS_FILE: &str = "traj_gen.toml";

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("traj_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Info, &session).wrap_err("Failed to initialise logging")?;

    info!("Trajectory Generation Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let args: Vec<String> = env::args().collect();
    debug!("CLI arguments: {:?}", args);

    let params_file = match args.len() {
        2 => args[1].as_str(),
        _ => DEFAULT_PARAMS_FILE,
    };

    let params: TrajGenParams = util::params::load(params_file)
        .wrap_err_with(|| format!("Could not load trajectory parameters from {}", params_file))?;

    info!(
        "Loaded {} waypoint(s) and {} speed zone(s) from {}",
        params.waypoints.len(),
        params.speed_zones.len(),
        params_file
    );

    // ---- INITIAL TRAJECTORY ----

    let mut path = params.build_path();
    let builder = TrajBuilder::new(params.constraints);

    let initial_traj = builder
        .build(&path, params.points_per_inch)
        .wrap_err("Could not build the initial trajectory")?;

    info!(
        "Initial trajectory: {} poses, {:.3} s",
        initial_traj.len(),
        initial_traj.total_time()
    );
    session.save("initial_trajectory.json", initial_traj);

    // ---- OPTIMISATION ----

    let start = Instant::now();

    path.optimise(
        params.optimise_layers,
        &params.constraints,
        params.points_per_inch,
    )
    .wrap_err("Could not optimise the path")?;

    info!("Optimisation took {:.3} s", start.elapsed().as_secs_f64());

    let traj = builder
        .build(&path, params.points_per_inch)
        .wrap_err("Could not build the optimised trajectory")?;

    info!(
        "Optimised trajectory: {} poses, {:.3} s",
        traj.len(),
        traj.total_time()
    );

    // ---- PLAYBACK ----

    let mut sim = DiffDriveSim::at_pose(&traj.states()[0], params.constraints.track_width_in);
    let sim_poses = sim.play(&traj, params.playback_period_s);

    if let Some(target) = traj.states().last() {
        info!(
            "Playback final pose error: {:.3} in, {:.4} rad",
            (target.position.x - sim.x).hypot(target.position.y - sim.y),
            get_ang_dist(sim.theta, target.heading)
        );
    }

    // ---- SAVE OUTPUTS ----

    session.save("optimised_waypoints.json", path.waypoints().to_vec());
    session.save("optimised_trajectory.json", traj);
    session.save("playback.json", sim_poses);

    session.exit();

    Ok(())
}

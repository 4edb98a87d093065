use argh::FromArgs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use glam::{Affine3A, Mat4, Quat, Vec2, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use optifit::face::REFERENCE_SPAN_VERTICES;
use optifit::landmarks::NormalizedRect;
use optifit::segment_height::{Eye, StepDirection};
use optifit::{
    ContactDetails, EstimatorConfig, FaceGeometrySample, FaceLandmarks, GazeState, Session,
    SessionCommand, SessionEvent,
};
use optifit_3d::camera::{CameraIntrinsic, ViewCamera};

const MESH_VERTICES: usize = 1220;
const VIEW_SIZE: Vec2 = Vec2::new(414.0, 896.0);
const FRAME_PERIOD: Duration = Duration::from_millis(50);

#[derive(FromArgs)]
/// Simulate a measurement session on a synthetic face
struct Args {
    /// path to a JSON estimator config
    #[argh(option)]
    config: Option<PathBuf>,

    /// first name for the report
    #[argh(option, default = "String::from(\"Ada\")")]
    first_name: String,

    /// last name for the report
    #[argh(option, default = "String::from(\"Lovelace\")")]
    last_name: String,

    /// email address for the report
    #[argh(option, default = "String::from(\"ada@example.com\")")]
    email: String,

    /// simulated seconds of scanning
    #[argh(option, default = "6")]
    seconds: u64,

    /// distance between the eye centers, in meters
    #[argh(option, default = "0.062")]
    eye_distance: f32,

    /// face distance from the camera, in meters
    #[argh(option, default = "0.35")]
    face_distance: f32,

    /// segment height steps to apply to each eye, negative moves up
    #[argh(option, default = "0")]
    sh_steps: i32,

    /// random seed
    #[argh(option, default = "7")]
    seed: u64,
}

/// Synthetic face in front of the camera.
struct Scene {
    camera: ViewCamera,
    vertices: Vec<Vec3>,
    left_eye: Vec3,
    right_eye: Vec3,
    nose: Vec3,
    face_distance: f32,
}

impl Scene {
    fn new(eye_distance: f32, face_distance: f32) -> Self {
        let half = eye_distance / 2.0;

        // 9mm vertical extent for each eye reference span
        let mut vertices = vec![Vec3::ZERO; MESH_VERTICES];
        let span_x = [-half - 0.001, -half + 0.001, half - 0.001, half + 0.001];
        for ((start, end), x) in REFERENCE_SPAN_VERTICES.iter().zip(span_x) {
            vertices[*start] = Vec3::new(x, 0.0045, 0.0);
            vertices[*end] = Vec3::new(x, -0.0045, 0.0);
        }

        Self {
            camera: ViewCamera::new(
                CameraIntrinsic {
                    fx: 1450.0,
                    fy: 1450.0,
                    cx: VIEW_SIZE.x / 2.0,
                    cy: VIEW_SIZE.y / 2.0,
                },
                Affine3A::IDENTITY,
            ),
            vertices,
            left_eye: Vec3::new(-half, 0.0, 0.0),
            right_eye: Vec3::new(half, 0.0, 0.0),
            nose: Vec3::new(0.0, -0.021, 0.012),
            face_distance,
        }
    }

    fn pose(&self, yaw_degrees: f32) -> Affine3A {
        Affine3A::from_rotation_translation(
            Quat::from_rotation_y(yaw_degrees.to_radians()),
            Vec3::new(0.0, 0.0, self.face_distance),
        )
    }

    fn geometry(&self, pose: Affine3A, gaze: GazeState) -> Option<SessionEvent> {
        let sample = FaceGeometrySample::from_mesh(
            &self.vertices,
            pose,
            Mat4::from_translation(self.left_eye),
            Mat4::from_translation(self.right_eye),
            gaze,
        )?;
        Some(SessionEvent::GeometryUpdated {
            sample: Box::new(sample),
            camera: self.camera,
        })
    }

    /// Landmarks as the detector would report them, normalized to the whole
    /// image with a bottom-left origin.
    fn landmarks(&self, pose: Affine3A, rng: &mut impl Rng) -> Option<FaceLandmarks> {
        let mut detect = |point: Vec3| -> Option<Vec2> {
            let uv = self.camera.project_point(pose.transform_point3(point))?;
            let noise = Vec2::new(rng.random_range(-0.6..0.6), rng.random_range(-0.6..0.6));
            let uv = uv + noise;
            Some(Vec2::new(uv.x / VIEW_SIZE.x, (VIEW_SIZE.y - uv.y) / VIEW_SIZE.y))
        };

        let left_pupil = detect(self.left_eye);
        let right_pupil = detect(self.right_eye);
        let nose_tip = detect(self.nose + Vec3::new(0.0, 0.01, 0.0))?;
        let nose_reference = detect(self.nose)?;

        Some(FaceLandmarks {
            bounding_box: NormalizedRect {
                x: 0.0,
                y: 0.0,
                width: 1.0,
                height: 1.0,
            },
            left_pupil,
            right_pupil,
            nose: vec![nose_tip, nose_reference],
        })
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<EstimatorConfig, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        return Ok(EstimatorConfig::default());
    };
    let file = std::fs::File::open(path)?;
    let config: EstimatorConfig = serde_json::from_reader(file)?;
    Ok(config)
}

/// Carry out the commands; returns whether a capture was requested.
fn execute(commands: &[SessionCommand]) -> bool {
    let mut capture = false;
    for command in commands {
        match command {
            SessionCommand::CaptureAndDetect => capture = true,
            SessionCommand::Display(lines) => {
                log::info!("{} | {}", lines.first, lines.second)
            }
            SessionCommand::ShowLoader(visible) => log::info!("loader visible: {visible}"),
            SessionCommand::ShowActions(visible) => log::info!("actions visible: {visible}"),
            SessionCommand::ShowSegmentHeightOverlay(overlay) => log::info!(
                "segment lines at y={:.2} / y={:.2}",
                overlay.left.segment_line_y,
                overlay.right.segment_line_y
            ),
            SessionCommand::PresentReport(report) => println!("{report}"),
            SessionCommand::ShowError { title, message } => {
                log::error!("{title}: {message}")
            }
            other => log::debug!("{other:?}"),
        }
    }
    capture
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let config = load_config(args.config.as_ref())?;
    let contact = ContactDetails::new(args.first_name, args.last_name, args.email)?;
    let mut session = Session::new(config, contact, VIEW_SIZE)?;

    let scene = Scene::new(args.eye_distance, args.face_distance);
    let mut rng = StdRng::seed_from_u64(args.seed);

    let start = Instant::now();
    execute(&session.handle(SessionEvent::Started, start)?);

    let frames = args.seconds * 1000 / FRAME_PERIOD.as_millis() as u64;
    for frame in 1..=frames {
        let now = start + FRAME_PERIOD * frame as u32;

        // the subject glances down now and then
        let yaw = rng.random_range(-4.0..4.0);
        let gaze = GazeState {
            look_down_left: if rng.random_bool(0.1) { 0.3 } else { 0.02 },
            ..Default::default()
        };
        let pose = scene.pose(yaw);

        if let Some(event) = scene.geometry(pose, gaze) {
            execute(&session.handle(event, now)?);
        }

        if execute(&session.handle(SessionEvent::Tick, now)?) {
            let faces = scene.landmarks(pose, &mut rng).into_iter().collect();
            execute(&session.handle(SessionEvent::LandmarksDetected(faces), now)?);
        }
    }

    let now = start + Duration::from_secs(args.seconds);
    if !session.actions_visible() {
        log::warn!(
            "measurement did not settle, {} samples collected",
            session.window().len()
        );
        execute(&session.handle(SessionEvent::TornDown, now)?);
        return Ok(());
    }

    execute(&session.handle(SessionEvent::MeasureSegmentHeight, now)?);
    let direction = if args.sh_steps < 0 {
        StepDirection::Up
    } else {
        StepDirection::Down
    };
    for _ in 0..args.sh_steps.unsigned_abs() {
        for eye in [Eye::Left, Eye::Right] {
            execute(&session.handle(SessionEvent::StepSegmentHeight { eye, direction }, now)?);
        }
    }

    execute(&session.handle(SessionEvent::Apply, now)?);
    execute(&session.handle(SessionEvent::ExportDismissed, now)?);
    execute(&session.handle(SessionEvent::TornDown, now)?);

    Ok(())
}

//! Tunable parameters for the water surface.
//!
//! [`SimConfig`] is a flat struct of named numbers that a settings UI may
//! change between any two ticks. The surface copies it once at the start of
//! each tick. Nothing here is validated or clamped; out-of-range values are
//! the caller's responsibility.

use ripple_core::params::{param_bool, param_f32, param_usize};
use serde_json::{json, Value};

const DEFAULT_DAMPING: f32 = 0.995;
const DEFAULT_VISCOSITY: f32 = 0.02;
/// Texels per second.
const DEFAULT_WAVE_SPEED: f32 = 40.0;
const DEFAULT_BOUNDARY_DAMPING: f32 = 0.6;
const DEFAULT_TILT_BIAS_SCALE: f32 = 30.0;
const DEFAULT_SHAKE_IMPULSE_SCALE: f32 = 1.0;
const DEFAULT_IMPULSE_STRENGTH: f32 = 0.6;
const DEFAULT_IMPULSE_RADIUS: f32 = 12.0;
/// Per pixel-per-second of touch speed.
const DEFAULT_VELOCITY_SCALE: f32 = 0.002;
const DEFAULT_ANISOTROPY_FACTOR: f32 = 2.0;
const DEFAULT_MAX_IMPULSE_PER_FRAME: f32 = 1.5;
const DEFAULT_SPLASH_THRESHOLD: f32 = 0.5;
const DEFAULT_MAX_PARTICLES: usize = 256;
/// Seconds.
const DEFAULT_PARTICLE_LIFETIME: f32 = 1.2;
const DEFAULT_PARTICLE_SIZE_MIN: f32 = 2.0;
const DEFAULT_PARTICLE_SIZE_MAX: f32 = 6.0;
const DEFAULT_PARTICLE_FEEDBACK_STRENGTH: f32 = 1.0;
const DEFAULT_NORMAL_STRENGTH: f32 = 4.0;
const DEFAULT_FOAM_VELOCITY_THRESHOLD: f32 = 8.0;
const DEFAULT_FOAM_INTENSITY: f32 = 0.05;

/// Simulation parameters.
///
/// Use [`Default`] for the tuned values; the documented ranges in
/// [`SimConfig::schema`] are the nominal envelope inside which every field
/// stays finite.
#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    /// Global per-tick multiplier on velocity and height.
    pub damping: f32,
    /// Fraction of velocity removed per tick.
    pub viscosity: f32,
    /// Wave propagation speed in texels per second.
    pub wave_speed: f32,
    /// Velocity multiplier at the wall; rises to 1 ten texels in.
    pub boundary_damping: f32,
    /// Acceleration per unit of lateral gravity.
    pub tilt_bias_scale: f32,
    pub shake_impulse_scale: f32,
    /// Base strength of a touch impulse at force 1.
    pub impulse_strength: f32,
    /// Touch impulse radius in texels.
    pub impulse_radius: f32,
    /// Converts touch speed (px/s) into the strength boost term.
    pub velocity_scale: f32,
    pub anisotropy_factor: f32,
    pub max_impulse_per_frame: f32,
    /// Touch strength above which a splash is spawned.
    pub splash_threshold: f32,
    pub max_particles: usize,
    /// Seconds a particle lives.
    pub particle_lifetime: f32,
    pub particle_size_min: f32,
    pub particle_size_max: f32,
    pub particle_feedback_strength: f32,
    /// Slope exaggeration used when deriving normals.
    pub normal_strength: f32,
    /// Flow speed (texels/s) below which no foam forms.
    pub foam_velocity_threshold: f32,
    pub foam_intensity: f32,
    /// Zero any non-finite cell after each tick.
    pub finite_guard: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            damping: DEFAULT_DAMPING,
            viscosity: DEFAULT_VISCOSITY,
            wave_speed: DEFAULT_WAVE_SPEED,
            boundary_damping: DEFAULT_BOUNDARY_DAMPING,
            tilt_bias_scale: DEFAULT_TILT_BIAS_SCALE,
            shake_impulse_scale: DEFAULT_SHAKE_IMPULSE_SCALE,
            impulse_strength: DEFAULT_IMPULSE_STRENGTH,
            impulse_radius: DEFAULT_IMPULSE_RADIUS,
            velocity_scale: DEFAULT_VELOCITY_SCALE,
            anisotropy_factor: DEFAULT_ANISOTROPY_FACTOR,
            max_impulse_per_frame: DEFAULT_MAX_IMPULSE_PER_FRAME,
            splash_threshold: DEFAULT_SPLASH_THRESHOLD,
            max_particles: DEFAULT_MAX_PARTICLES,
            particle_lifetime: DEFAULT_PARTICLE_LIFETIME,
            particle_size_min: DEFAULT_PARTICLE_SIZE_MIN,
            particle_size_max: DEFAULT_PARTICLE_SIZE_MAX,
            particle_feedback_strength: DEFAULT_PARTICLE_FEEDBACK_STRENGTH,
            normal_strength: DEFAULT_NORMAL_STRENGTH,
            foam_velocity_threshold: DEFAULT_FOAM_VELOCITY_THRESHOLD,
            foam_intensity: DEFAULT_FOAM_INTENSITY,
            finite_guard: false,
        }
    }
}

impl SimConfig {
    /// Extracts parameters from a JSON object, falling back to defaults for
    /// missing or mistyped keys.
    pub fn from_json(params: &Value) -> Self {
        Self {
            damping: param_f32(params, "damping", DEFAULT_DAMPING),
            viscosity: param_f32(params, "viscosity", DEFAULT_VISCOSITY),
            wave_speed: param_f32(params, "wave_speed", DEFAULT_WAVE_SPEED),
            boundary_damping: param_f32(params, "boundary_damping", DEFAULT_BOUNDARY_DAMPING),
            tilt_bias_scale: param_f32(params, "tilt_bias_scale", DEFAULT_TILT_BIAS_SCALE),
            shake_impulse_scale: param_f32(
                params,
                "shake_impulse_scale",
                DEFAULT_SHAKE_IMPULSE_SCALE,
            ),
            impulse_strength: param_f32(params, "impulse_strength", DEFAULT_IMPULSE_STRENGTH),
            impulse_radius: param_f32(params, "impulse_radius", DEFAULT_IMPULSE_RADIUS),
            velocity_scale: param_f32(params, "velocity_scale", DEFAULT_VELOCITY_SCALE),
            anisotropy_factor: param_f32(params, "anisotropy_factor", DEFAULT_ANISOTROPY_FACTOR),
            max_impulse_per_frame: param_f32(
                params,
                "max_impulse_per_frame",
                DEFAULT_MAX_IMPULSE_PER_FRAME,
            ),
            splash_threshold: param_f32(params, "splash_threshold", DEFAULT_SPLASH_THRESHOLD),
            max_particles: param_usize(params, "max_particles", DEFAULT_MAX_PARTICLES),
            particle_lifetime: param_f32(params, "particle_lifetime", DEFAULT_PARTICLE_LIFETIME),
            particle_size_min: param_f32(params, "particle_size_min", DEFAULT_PARTICLE_SIZE_MIN),
            particle_size_max: param_f32(params, "particle_size_max", DEFAULT_PARTICLE_SIZE_MAX),
            particle_feedback_strength: param_f32(
                params,
                "particle_feedback_strength",
                DEFAULT_PARTICLE_FEEDBACK_STRENGTH,
            ),
            normal_strength: param_f32(params, "normal_strength", DEFAULT_NORMAL_STRENGTH),
            foam_velocity_threshold: param_f32(
                params,
                "foam_velocity_threshold",
                DEFAULT_FOAM_VELOCITY_THRESHOLD,
            ),
            foam_intensity: param_f32(params, "foam_intensity", DEFAULT_FOAM_INTENSITY),
            finite_guard: param_bool(params, "finite_guard", false),
        }
    }

    /// Current values as a JSON object (the inverse of [`SimConfig::from_json`]).
    pub fn to_json(&self) -> Value {
        json!({
            "damping": self.damping,
            "viscosity": self.viscosity,
            "wave_speed": self.wave_speed,
            "boundary_damping": self.boundary_damping,
            "tilt_bias_scale": self.tilt_bias_scale,
            "shake_impulse_scale": self.shake_impulse_scale,
            "impulse_strength": self.impulse_strength,
            "impulse_radius": self.impulse_radius,
            "velocity_scale": self.velocity_scale,
            "anisotropy_factor": self.anisotropy_factor,
            "max_impulse_per_frame": self.max_impulse_per_frame,
            "splash_threshold": self.splash_threshold,
            "max_particles": self.max_particles,
            "particle_lifetime": self.particle_lifetime,
            "particle_size_min": self.particle_size_min,
            "particle_size_max": self.particle_size_max,
            "particle_feedback_strength": self.particle_feedback_strength,
            "normal_strength": self.normal_strength,
            "foam_velocity_threshold": self.foam_velocity_threshold,
            "foam_intensity": self.foam_intensity,
            "finite_guard": self.finite_guard,
        })
    }

    /// Type, default, nominal range and description of every parameter.
    pub fn schema() -> Value {
        json!({
            "damping": number(DEFAULT_DAMPING, 0.9, 1.0, "Global per-tick damping of velocity and height"),
            "viscosity": number(DEFAULT_VISCOSITY, 0.0, 0.2, "Fraction of velocity removed per tick"),
            "wave_speed": number(DEFAULT_WAVE_SPEED, 1.0, 80.0, "Wave speed in texels per second (keep wave_speed * dt below 1.4)"),
            "boundary_damping": number(DEFAULT_BOUNDARY_DAMPING, 0.0, 1.0, "Velocity multiplier at the walls (1 = full reflection)"),
            "tilt_bias_scale": number(DEFAULT_TILT_BIAS_SCALE, 0.0, 100.0, "Lateral acceleration per unit of device gravity"),
            "shake_impulse_scale": number(DEFAULT_SHAKE_IMPULSE_SCALE, 0.0, 5.0, "Strength multiplier for shake bursts"),
            "impulse_strength": number(DEFAULT_IMPULSE_STRENGTH, 0.0, 5.0, "Base touch impulse strength at full force"),
            "impulse_radius": number(DEFAULT_IMPULSE_RADIUS, 1.0, 64.0, "Touch impulse radius in texels"),
            "velocity_scale": number(DEFAULT_VELOCITY_SCALE, 0.0, 0.02, "Strength boost per px/s of touch speed"),
            "anisotropy_factor": number(DEFAULT_ANISOTROPY_FACTOR, 0.0, 8.0, "Perpendicular compression of fast-swipe impulses"),
            "max_impulse_per_frame": number(DEFAULT_MAX_IMPULSE_PER_FRAME, 0.0, 5.0, "Upper bound on a single touch impulse"),
            "splash_threshold": number(DEFAULT_SPLASH_THRESHOLD, 0.0, 5.0, "Touch strength above which splash particles spawn"),
            "max_particles": {
                "type": "integer",
                "default": DEFAULT_MAX_PARTICLES,
                "min": 0,
                "max": 4096,
                "description": "Live splash particle budget (oldest evicted first)"
            },
            "particle_lifetime": number(DEFAULT_PARTICLE_LIFETIME, 0.1, 5.0, "Particle lifetime in seconds"),
            "particle_size_min": number(DEFAULT_PARTICLE_SIZE_MIN, 0.5, 32.0, "Smallest particle sprite size"),
            "particle_size_max": number(DEFAULT_PARTICLE_SIZE_MAX, 0.5, 32.0, "Largest particle sprite size"),
            "particle_feedback_strength": number(DEFAULT_PARTICLE_FEEDBACK_STRENGTH, 0.0, 10.0, "Multiplier on the ripple a landing particle creates"),
            "normal_strength": number(DEFAULT_NORMAL_STRENGTH, 0.0, 32.0, "Slope exaggeration for derived normals"),
            "foam_velocity_threshold": number(DEFAULT_FOAM_VELOCITY_THRESHOLD, 0.0, 100.0, "Flow speed below which no foam forms"),
            "foam_intensity": number(DEFAULT_FOAM_INTENSITY, 0.0, 1.0, "Foam per texel/s of excess flow speed"),
            "finite_guard": {
                "type": "boolean",
                "default": false,
                "description": "Zero non-finite cells after each tick instead of letting them spread"
            }
        })
    }
}

fn number(default: f32, min: f32, max: f32, description: &str) -> Value {
    json!({
        "type": "number",
        "default": default,
        "min": min,
        "max": max,
        "description": description,
    })
}

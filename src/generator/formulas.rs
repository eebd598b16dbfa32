//! Closed-form physics formulas, one small `Generator` per topic.

use std::f64::consts::PI;

use super::{AnswerValue, Computed, Generator, ResolvedParams};
use crate::error::Result;
use crate::rng::QuestionRng;
use crate::util::format_number;

const G: f64 = 9.81;
const SPEED_OF_SOUND: f64 = 343.0;
const COULOMB_K: f64 = 8.99e9;
const CELSIUS_OFFSET: f64 = 273.0;

pub const TOTAL_INTERNAL_REFLECTION: &str = "total internal reflection";

fn n(v: f64) -> String {
    format_number(v, 2)
}

fn computed(prompt: String, value: f64, explanation: &str) -> Result<Computed> {
    Ok(Computed {
        prompt,
        value: AnswerValue::Number(value),
        explanation: Some(explanation.to_string()),
    })
}

pub struct SnellsLaw;

impl SnellsLaw {
    /// Refraction angle in degrees, or `None` past the critical angle
    pub fn refraction_angle(n1: f64, n2: f64, theta1_deg: f64) -> Option<f64> {
        let sin_theta2 = n1 * theta1_deg.to_radians().sin() / n2;
        if sin_theta2.abs() > 1.0 {
            None
        } else {
            Some(sin_theta2.asin().to_degrees())
        }
    }
}

impl Generator for SnellsLaw {
    fn key(&self) -> &'static str {
        "snells-law"
    }
    fn name(&self) -> &'static str {
        "Snell's Law"
    }
    fn description(&self) -> &'static str {
        "Light refraction at the boundary between two media"
    }
    fn default_params(&self) -> &'static [(&'static str, f64)] {
        &[
            ("n1Min", 1.0),
            ("n1Max", 1.5),
            ("n2Min", 1.3),
            ("n2Max", 2.0),
            ("theta1Min", 15.0),
            ("theta1Max", 60.0),
        ]
    }

    fn compute(&self, params: &ResolvedParams, rng: &mut QuestionRng) -> Result<Computed> {
        let n1 = params.draw(rng, "n1")?;
        let n2 = params.draw(rng, "n2")?;
        let theta1 = params.draw(rng, "theta1")?;

        let prompt = format!(
            "A light ray passes from a medium with refractive index n₁ = {} into one with n₂ = {}. \
             The angle of incidence is {}°. What is the angle of refraction (in degrees)?",
            n(n1),
            n(n2),
            n(theta1)
        );
        let explanation = Some("sin θ₂ = n₁ sin θ₁ / n₂".to_string());

        let value = match Self::refraction_angle(n1, n2, theta1) {
            Some(theta2) => AnswerValue::Number(theta2),
            None => AnswerValue::Sentinel(TOTAL_INTERNAL_REFLECTION),
        };
        Ok(Computed {
            prompt,
            value,
            explanation,
        })
    }
}

pub struct ProjectileMotion;

impl Generator for ProjectileMotion {
    fn key(&self) -> &'static str {
        "projectile-motion"
    }
    fn name(&self) -> &'static str {
        "Projectile Motion"
    }
    fn description(&self) -> &'static str {
        "Maximum height of a projectile launched at an angle"
    }
    fn default_params(&self) -> &'static [(&'static str, f64)] {
        &[
            ("velocityMin", 10.0),
            ("velocityMax", 30.0),
            ("angleMin", 20.0),
            ("angleMax", 70.0),
            ("heightMin", 0.0),
            ("heightMax", 10.0),
        ]
    }

    fn compute(&self, params: &ResolvedParams, rng: &mut QuestionRng) -> Result<Computed> {
        let v0 = params.draw(rng, "velocity")?;
        let theta = params.draw(rng, "angle")?;
        let h0 = params.draw(rng, "height")?;

        let v0y = v0 * theta.to_radians().sin();
        let h_max = h0 + v0y * v0y / (2.0 * G);

        computed(
            format!(
                "A projectile leaves a height of {} m at {} m/s, {}° above the horizontal. \
                 What maximum height does it reach (in meters)?",
                n(h0),
                n(v0),
                n(theta)
            ),
            h_max,
            "h = h₀ + (v₀ sin θ)² / 2g",
        )
    }
}

pub struct CircularMotion;

impl Generator for CircularMotion {
    fn key(&self) -> &'static str {
        "circular-motion"
    }
    fn name(&self) -> &'static str {
        "Circular Motion"
    }
    fn description(&self) -> &'static str {
        "Centripetal acceleration of uniform circular motion"
    }
    fn default_params(&self) -> &'static [(&'static str, f64)] {
        &[
            ("radiusMin", 1.0),
            ("radiusMax", 10.0),
            ("velocityMin", 5.0),
            ("velocityMax", 20.0),
        ]
    }

    fn compute(&self, params: &ResolvedParams, rng: &mut QuestionRng) -> Result<Computed> {
        let r = params.draw(rng, "radius")?;
        let v = params.draw(rng, "velocity")?;

        computed(
            format!(
                "An object moves on a circle of radius {} m at a constant {} m/s. \
                 What is its centripetal acceleration (in m/s²)?",
                n(r),
                n(v)
            ),
            v * v / r,
            "a = v² / r",
        )
    }
}

pub struct WorkEnergy;

impl Generator for WorkEnergy {
    fn key(&self) -> &'static str {
        "work-energy"
    }
    fn name(&self) -> &'static str {
        "Work and Energy"
    }
    fn description(&self) -> &'static str {
        "Gravitational potential energy gained by lifting a mass"
    }
    fn default_params(&self) -> &'static [(&'static str, f64)] {
        &[
            ("massMin", 1.0),
            ("massMax", 10.0),
            ("heightMin", 2.0),
            ("heightMax", 15.0),
        ]
    }

    fn compute(&self, params: &ResolvedParams, rng: &mut QuestionRng) -> Result<Computed> {
        let m = params.draw(rng, "mass")?;
        let h = params.draw(rng, "height")?;

        computed(
            format!(
                "A {} kg object is raised by {} m. How much gravitational potential energy \
                 does it gain (in joules)?",
                n(m),
                n(h)
            ),
            m * G * h,
            "U = m g h",
        )
    }
}

pub struct NewtonsLaw;

impl Generator for NewtonsLaw {
    fn key(&self) -> &'static str {
        "newtons-law"
    }
    fn name(&self) -> &'static str {
        "Newton's Second Law"
    }
    fn description(&self) -> &'static str {
        "Acceleration of a pushed block with kinetic friction"
    }
    fn default_params(&self) -> &'static [(&'static str, f64)] {
        &[
            ("massMin", 1.0),
            ("massMax", 20.0),
            ("forceMin", 10.0),
            ("forceMax", 100.0),
            ("frictionCoefMin", 0.1),
            ("frictionCoefMax", 0.5),
        ]
    }

    fn compute(&self, params: &ResolvedParams, rng: &mut QuestionRng) -> Result<Computed> {
        let m = params.draw(rng, "mass")?;
        let force = params.draw(rng, "force")?;
        let mu = params.draw(rng, "frictionCoef")?;

        let net = force - mu * m * G;

        computed(
            format!(
                "A {} kg block is pushed with {} N across a surface with friction coefficient \
                 μ = {}. What is its acceleration (in m/s²)?",
                n(m),
                n(force),
                n(mu)
            ),
            net / m,
            "a = (F − μ m g) / m",
        )
    }
}

pub struct SimpleHarmonic;

impl Generator for SimpleHarmonic {
    fn key(&self) -> &'static str {
        "simple-harmonic"
    }
    fn name(&self) -> &'static str {
        "Simple Harmonic Motion"
    }
    fn description(&self) -> &'static str {
        "Oscillation period of a mass on a spring"
    }
    fn default_params(&self) -> &'static [(&'static str, f64)] {
        &[
            ("springConstantMin", 100.0),
            ("springConstantMax", 500.0),
            ("massMin", 0.1),
            ("massMax", 2.0),
            ("amplitudeMin", 0.05),
            ("amplitudeMax", 0.2),
        ]
    }

    fn compute(&self, params: &ResolvedParams, rng: &mut QuestionRng) -> Result<Computed> {
        let k = params.draw(rng, "springConstant")?;
        let m = params.draw(rng, "mass")?;
        let amplitude = params.draw(rng, "amplitude")?;

        computed(
            format!(
                "A {} kg mass hangs on a spring with k = {} N/m and is pulled {} m from rest. \
                 What is the period of oscillation (in seconds)?",
                n(m),
                n(k),
                n(amplitude)
            ),
            2.0 * PI * (m / k).sqrt(),
            "T = 2π √(m / k)",
        )
    }
}

pub struct DopplerEffect;

impl Generator for DopplerEffect {
    fn key(&self) -> &'static str {
        "doppler-effect"
    }
    fn name(&self) -> &'static str {
        "Doppler Effect"
    }
    fn description(&self) -> &'static str {
        "Observed frequency with a moving source and observer"
    }
    fn default_params(&self) -> &'static [(&'static str, f64)] {
        &[
            ("sourceFreqMin", 200.0),
            ("sourceFreqMax", 1000.0),
            ("sourceSpeedMin", 5.0),
            ("sourceSpeedMax", 30.0),
            ("observerSpeedMin", 0.0),
            ("observerSpeedMax", 20.0),
        ]
    }

    fn compute(&self, params: &ResolvedParams, rng: &mut QuestionRng) -> Result<Computed> {
        let f0 = params.draw(rng, "sourceFreq")?;
        let vs = params.draw(rng, "sourceSpeed")?;
        let vo = params.draw(rng, "observerSpeed")?;

        computed(
            format!(
                "A source emitting {} Hz moves at {} m/s while an observer moves toward it at {} m/s. \
                 What frequency does the observer hear (in Hz)?",
                n(f0),
                n(vs),
                n(vo)
            ),
            f0 * (SPEED_OF_SOUND + vo) / (SPEED_OF_SOUND - vs),
            "f = f₀ (v + v₀) / (v − vₛ), v = 343 m/s",
        )
    }
}

pub struct ElectricField;

impl Generator for ElectricField {
    fn key(&self) -> &'static str {
        "electric-field"
    }
    fn name(&self) -> &'static str {
        "Electric Forces"
    }
    fn description(&self) -> &'static str {
        "Coulomb force between two point charges"
    }
    fn default_params(&self) -> &'static [(&'static str, f64)] {
        &[
            ("charge1Min", 1e-6),
            ("charge1Max", 1e-5),
            ("charge2Min", 1e-6),
            ("charge2Max", 1e-5),
            ("distanceMin", 0.1),
            ("distanceMax", 1.0),
        ]
    }

    fn compute(&self, params: &ResolvedParams, rng: &mut QuestionRng) -> Result<Computed> {
        // charges are bounded in coulombs but drawn in μC
        let q1_uc = params.draw_scaled(rng, "charge1", 1e6)?;
        let q2_uc = params.draw_scaled(rng, "charge2", 1e6)?;
        let r = params.draw(rng, "distance")?;

        let force = COULOMB_K * (q1_uc * 1e-6 * q2_uc * 1e-6).abs() / (r * r);

        computed(
            format!(
                "Point charges of {} μC and {} μC are {} m apart. \
                 What is the magnitude of the force between them (in N)?",
                n(q1_uc),
                n(q2_uc),
                n(r)
            ),
            force,
            "F = k |q₁ q₂| / r²",
        )
    }
}

pub struct IdealGas;

impl Generator for IdealGas {
    fn key(&self) -> &'static str {
        "ideal-gas"
    }
    fn name(&self) -> &'static str {
        "Ideal Gas Law"
    }
    fn description(&self) -> &'static str {
        "Volume change of a gas heated or cooled at constant pressure"
    }
    fn default_params(&self) -> &'static [(&'static str, f64)] {
        &[
            ("volumeMin", 0.001),
            ("volumeMax", 0.01),
            ("pressureMin", 1e5),
            ("pressureMax", 5e5),
            ("temperatureMin", 273.0),
            ("temperatureMax", 373.0),
        ]
    }

    fn compute(&self, params: &ResolvedParams, rng: &mut QuestionRng) -> Result<Computed> {
        // volume bounded in m³, drawn in litres
        let v1_l = params.draw_scaled(rng, "volume", 1000.0)?;
        let p1 = params.draw(rng, "pressure")?;
        let t1 = params.draw(rng, "temperature")?;
        let t2 = params.draw(rng, "temperature")?;

        computed(
            format!(
                "A gas occupies {} L at {} kPa and {}°C. At constant pressure the temperature \
                 changes to {}°C. What is the new volume (in L)?",
                n(v1_l),
                n(p1 / 1000.0),
                n(t1 - CELSIUS_OFFSET),
                n(t2 - CELSIUS_OFFSET)
            ),
            v1_l * t2 / t1,
            "V₂ = V₁ T₂ / T₁ at constant P",
        )
    }
}

pub struct Collision;

impl Generator for Collision {
    fn key(&self) -> &'static str {
        "collision"
    }
    fn name(&self) -> &'static str {
        "Momentum and Collisions"
    }
    fn description(&self) -> &'static str {
        "Final velocity of the struck body in a 1D elastic collision"
    }
    fn default_params(&self) -> &'static [(&'static str, f64)] {
        &[
            ("mass1Min", 1.0),
            ("mass1Max", 10.0),
            ("mass2Min", 1.0),
            ("mass2Max", 10.0),
            ("velocity1Min", 2.0),
            ("velocity1Max", 15.0),
        ]
    }

    fn compute(&self, params: &ResolvedParams, rng: &mut QuestionRng) -> Result<Computed> {
        let m1 = params.draw(rng, "mass1")?;
        let m2 = params.draw(rng, "mass2")?;
        let v1 = params.draw(rng, "velocity1")?;

        computed(
            format!(
                "A {} kg body moving at {} m/s hits a resting {} kg body in a perfectly elastic \
                 collision. What is the final velocity of the second body (in m/s)?",
                n(m1),
                n(v1),
                n(m2)
            ),
            2.0 * m1 * v1 / (m1 + m2),
            "v₂' = 2 m₁ v₁ / (m₁ + m₂)",
        )
    }
}

pub struct Wave;

impl Generator for Wave {
    fn key(&self) -> &'static str {
        "wave"
    }
    fn name(&self) -> &'static str {
        "Wave Properties"
    }
    fn description(&self) -> &'static str {
        "Wave speed from frequency and wavelength"
    }
    fn default_params(&self) -> &'static [(&'static str, f64)] {
        &[
            ("frequencyMin", 100.0),
            ("frequencyMax", 1000.0),
            ("wavelengthMin", 0.1),
            ("wavelengthMax", 1.0),
        ]
    }

    fn compute(&self, params: &ResolvedParams, rng: &mut QuestionRng) -> Result<Computed> {
        let f = params.draw(rng, "frequency")?;
        let lambda = params.draw(rng, "wavelength")?;

        computed(
            format!(
                "A wave has frequency {} Hz and wavelength {} m. How fast does it travel (in m/s)?",
                n(f),
                n(lambda)
            ),
            f * lambda,
            "v = f λ",
        )
    }
}

pub struct RotationalMotion;

impl Generator for RotationalMotion {
    fn key(&self) -> &'static str {
        "rotational-motion"
    }
    fn name(&self) -> &'static str {
        "Rotational Motion"
    }
    fn description(&self) -> &'static str {
        "Angular momentum of a spinning solid disk"
    }
    fn default_params(&self) -> &'static [(&'static str, f64)] {
        &[
            ("radiusMin", 0.1),
            ("radiusMax", 1.0),
            ("angularVelocityMin", 1.0),
            ("angularVelocityMax", 10.0),
            ("massMin", 0.1),
            ("massMax", 2.0),
        ]
    }

    fn compute(&self, params: &ResolvedParams, rng: &mut QuestionRng) -> Result<Computed> {
        let r = params.draw(rng, "radius")?;
        let omega = params.draw(rng, "angularVelocity")?;
        let m = params.draw(rng, "mass")?;

        let inertia = 0.5 * m * r * r;

        computed(
            format!(
                "A solid disk of mass {} kg and radius {} m spins at {} rad/s. \
                 What is its angular momentum (in kg·m²/s)?",
                n(m),
                n(r),
                n(omega)
            ),
            inertia * omega,
            "L = I ω, I = ½ m r²",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::GeneratorParams;

    fn fixed(pairs: &[(&str, f64)]) -> GeneratorParams {
        pairs
            .iter()
            .flat_map(|(k, v)| {
                [
                    (format!("{k}Min"), Some(*v)),
                    (format!("{k}Max"), Some(*v)),
                ]
            })
            .collect()
    }

    fn value_of<G: Generator>(g: &G, pairs: &[(&str, f64)]) -> AnswerValue {
        let params = ResolvedParams::resolve(g.default_params(), &fixed(pairs));
        let mut rng = QuestionRng::from_seed(0);
        g.compute(&params, &mut rng).unwrap().value
    }

    fn number(v: AnswerValue) -> f64 {
        match v {
            AnswerValue::Number(x) => x,
            AnswerValue::Sentinel(s) => panic!("unexpected sentinel {s}"),
        }
    }

    #[test]
    fn snell_refracts_toward_normal() {
        let v = number(value_of(&SnellsLaw, &[("n1", 1.0), ("n2", 1.5), ("theta1", 80.0)]));
        // sin θ₂ = sin 80° / 1.5 ≈ 0.657
        assert!((v.to_radians().sin() - 0.657).abs() < 1e-3);
        assert!((v - 41.04).abs() < 0.1);
    }

    #[test]
    fn snell_past_critical_angle_is_total_internal_reflection() {
        let v = value_of(&SnellsLaw, &[("n1", 1.5), ("n2", 1.0), ("theta1", 70.0)]);
        assert_eq!(v, AnswerValue::Sentinel(TOTAL_INTERNAL_REFLECTION));
    }

    #[test]
    fn projectile_max_height() {
        let v = number(value_of(
            &ProjectileMotion,
            &[("velocity", 20.0), ("angle", 90.0), ("height", 5.0)],
        ));
        assert!((v - (5.0 + 400.0 / (2.0 * G))).abs() < 1e-9);
    }

    #[test]
    fn centripetal_acceleration() {
        let v = number(value_of(&CircularMotion, &[("radius", 2.0), ("velocity", 10.0)]));
        assert!((v - 50.0).abs() < 1e-9);
    }

    #[test]
    fn spring_period() {
        let v = number(value_of(&SimpleHarmonic, &[("springConstant", 400.0), ("mass", 1.0), ("amplitude", 0.1)]));
        assert!((v - 2.0 * PI / 20.0).abs() < 1e-9);
    }

    #[test]
    fn doppler_shift() {
        let v = number(value_of(
            &DopplerEffect,
            &[("sourceFreq", 500.0), ("sourceSpeed", 10.0), ("observerSpeed", 0.0)],
        ));
        assert!((v - 500.0 * 343.0 / 333.0).abs() < 1e-9);
    }

    #[test]
    fn coulomb_force_uses_microcoulomb_draws() {
        let v = number(value_of(
            &ElectricField,
            &[("charge1", 2e-6), ("charge2", 5e-6), ("distance", 0.5)],
        ));
        assert!((v - COULOMB_K * 1e-11 / 0.25).abs() < 1e-9);
        assert!(v > 0.0);
    }

    #[test]
    fn isobaric_volume() {
        let v = number(value_of(
            &IdealGas,
            &[("volume", 0.002), ("pressure", 1e5), ("temperature", 300.0)],
        ));
        assert!((v - 2.0).abs() < 1e-9);
    }

    #[test]
    fn elastic_collision_equal_masses_transfers_velocity() {
        let v = number(value_of(&Collision, &[("mass1", 3.0), ("mass2", 3.0), ("velocity1", 7.0)]));
        assert!((v - 7.0).abs() < 1e-9);
    }

    #[test]
    fn disk_angular_momentum() {
        let v = number(value_of(
            &RotationalMotion,
            &[("radius", 0.5), ("angularVelocity", 4.0), ("mass", 2.0)],
        ));
        assert!((v - 1.0).abs() < 1e-9);
    }

    #[test]
    fn friction_can_exceed_push() {
        let v = number(value_of(&NewtonsLaw, &[("mass", 10.0), ("force", 10.0), ("frictionCoef", 0.5)]));
        assert!(v < 0.0);
    }
}

//! Lumen - CPU Path Tracing
//!
//! A recursive Monte Carlo path tracer: a camera casts jittered rays
//! through a virtual viewport, bounces them around the scene until they
//! escape, are absorbed, or run out of depth, and averages the samples
//! into pixels.

mod camera;
mod color;
mod error;
mod hittable;
mod material;
mod renderer;
mod sphere;

pub use camera::{Camera, CameraConfig};
pub use color::{color_to_rgb8, linear_to_gamma, write_color, Color};
pub use error::RenderError;
pub use hittable::{HitRecord, Hittable, HittableList};
pub use material::{Dielectric, Lambertian, Material, Metal, ScatterResult};
pub use renderer::{ray_color, render, render_pixel, render_ppm, ImageBuffer};
pub use sphere::Sphere;

/// Re-export math types from lumen_math
pub use lumen_math::{Interval, Ray, Vec3};

use rand::{Rng, RngCore};

/// Draw a uniform random f32 in [0, 1).
#[inline]
pub fn gen_f32(rng: &mut dyn RngCore) -> f32 {
    rng.gen()
}

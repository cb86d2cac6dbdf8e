//! Core path tracing renderer.
//!
//! Drives the per-pixel, per-sample loop over a camera and scene:
//! recursive Monte Carlo light transport with bounded depth,
//! anti-aliasing via multi-sampling, and scan-order output.

use crate::{color_to_rgb8, write_color, Camera, Color, HitRecord, Hittable, RenderError};
use lumen_math::{Interval, Ray};
use rand::RngCore;
use std::io::{self, Write};
use std::path::Path;

/// Compute the color seen by a ray.
///
/// This is the core path tracing function. It bounces the ray around the
/// scene, multiplying attenuation along the path, until the ray escapes
/// into the sky, is absorbed, or runs out of depth.
pub fn ray_color(ray: &Ray, world: &dyn Hittable, depth: u32, rng: &mut dyn RngCore) -> Color {
    // Path exhausted: no more light is gathered
    if depth == 0 {
        return Color::ZERO;
    }

    let mut rec = HitRecord::default();

    // The 0.001 lower bound skips self-intersections at the bounce origin
    if world.hit(ray, Interval::new(0.001, f32::INFINITY), &mut rec) {
        return match rec.material.scatter(ray, &rec, rng) {
            Some(scatter) => {
                scatter.attenuation * ray_color(&scatter.scattered, world, depth - 1, rng)
            }
            None => Color::ZERO,
        };
    }

    sky_gradient(ray)
}

/// Background sky gradient, the scene's only light source: white at the
/// horizon's lower edge blending to sky blue overhead.
fn sky_gradient(ray: &Ray) -> Color {
    let unit_direction = ray.direction().normalize();
    let a = 0.5 * (unit_direction.y + 1.0);
    let white = Color::new(1.0, 1.0, 1.0);
    let blue = Color::new(0.5, 0.7, 1.0);
    white * (1.0 - a) + blue * a
}

/// Render a single pixel with multi-sampling.
pub fn render_pixel(
    camera: &Camera,
    world: &dyn Hittable,
    i: u32,
    j: u32,
    rng: &mut dyn RngCore,
) -> Color {
    let mut pixel_color = Color::ZERO;

    for _ in 0..camera.samples_per_pixel() {
        // get_ray adds the per-sample jitter for anti-aliasing
        let ray = camera.get_ray(i, j, rng);
        pixel_color += ray_color(&ray, world, camera.max_depth(), rng);
    }

    camera.pixel_samples_scale() * pixel_color
}

/// Render the entire scene into an image buffer, in scan order.
pub fn render(camera: &Camera, world: &dyn Hittable, rng: &mut dyn RngCore) -> ImageBuffer {
    let mut image = ImageBuffer::new(camera.image_width(), camera.image_height());

    for j in 0..camera.image_height() {
        log::debug!("scanlines remaining: {}", camera.image_height() - j);
        for i in 0..camera.image_width() {
            let color = render_pixel(camera, world, i, j, rng);
            image.set(i, j, color);
        }
    }

    log::info!(
        "rendered {}x{} pixels at {} samples per pixel",
        camera.image_width(),
        camera.image_height(),
        camera.samples_per_pixel()
    );

    image
}

/// Render the scene and stream it out as a plain-PPM (P3) image.
///
/// Pixels are written row-major, top row first, and each completed row is
/// flushed, so an interrupted render leaves a readable partial image.
/// Progress goes to the log facade, not the output stream.
pub fn render_ppm<W: Write>(
    camera: &Camera,
    world: &dyn Hittable,
    rng: &mut dyn RngCore,
    writer: &mut W,
) -> Result<(), RenderError> {
    write_ppm_header(writer, camera.image_width(), camera.image_height())?;

    for j in 0..camera.image_height() {
        log::debug!("scanlines remaining: {}", camera.image_height() - j);
        for i in 0..camera.image_width() {
            let color = render_pixel(camera, world, i, j, rng);
            write_color(writer, color)?;
        }
        writer.flush()?;
    }

    log::info!(
        "rendered {}x{} pixels at {} samples per pixel",
        camera.image_width(),
        camera.image_height(),
        camera.samples_per_pixel()
    );

    Ok(())
}

fn write_ppm_header<W: Write>(writer: &mut W, width: u32, height: u32) -> io::Result<()> {
    writeln!(writer, "P3")?;
    writeln!(writer, "{} {}", width, height)?;
    writeln!(writer, "255")
}

/// Simple image buffer for storing render output.
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; (width * height) as usize],
        }
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[(y * self.width + x) as usize]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        self.pixels[(y * self.width + x) as usize] = color;
    }

    /// Encode the buffer as 8-bit RGB bytes, row-major.
    pub fn to_rgb8(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity((self.width * self.height * 3) as usize);
        for color in &self.pixels {
            bytes.extend_from_slice(&color_to_rgb8(*color));
        }
        bytes
    }

    /// Write the buffer as a plain-PPM (P3) image.
    pub fn write_ppm<W: Write>(&self, writer: &mut W) -> Result<(), RenderError> {
        write_ppm_header(writer, self.width, self.height)?;
        for color in &self.pixels {
            write_color(writer, *color)?;
        }
        Ok(())
    }

    /// Save the buffer as a PNG file.
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<(), RenderError> {
        let mut img = image::RgbImage::new(self.width, self.height);
        for (x, y, pixel) in img.enumerate_pixels_mut() {
            pixel.0 = color_to_rgb8(self.get(x, y));
        }
        img.save(path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CameraConfig, HittableList, Lambertian, Sphere};
    use lumen_math::{Ray, Vec3};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sky_at(direction: Vec3) -> Color {
        let a = 0.5 * (direction.normalize().y + 1.0);
        (1.0 - a) * Color::ONE + a * Color::new(0.5, 0.7, 1.0)
    }

    #[test]
    fn test_depth_zero_is_black() {
        // Even with geometry squarely in front of the ray
        let mut world = HittableList::new();
        world.add(Box::new(Sphere::new(
            Vec3::new(0.0, 0.0, -1.0),
            0.5,
            Lambertian::new(Color::new(0.9, 0.9, 0.9)),
        )));

        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let mut rng = StdRng::seed_from_u64(42);

        assert_eq!(ray_color(&ray, &world, 0, &mut rng), Color::ZERO);
    }

    #[test]
    fn test_miss_returns_sky_gradient() {
        let world = HittableList::new();
        let mut rng = StdRng::seed_from_u64(42);

        for direction in [
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, -1.0, 0.0),
            Vec3::new(0.3, 0.2, -1.0),
        ] {
            let ray = Ray::new(Vec3::ZERO, direction);
            let color = ray_color(&ray, &world, 5, &mut rng);
            assert!((color - sky_at(direction)).length() < 1e-6);
        }

        // Straight down is pure white, straight up is pure sky blue
        let down = Ray::new(Vec3::ZERO, Vec3::new(0.0, -1.0, 0.0));
        assert!((ray_color(&down, &world, 5, &mut rng) - Color::ONE).length() < 1e-6);
        let up = Ray::new(Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0));
        assert!((ray_color(&up, &world, 5, &mut rng) - Color::new(0.5, 0.7, 1.0)).length() < 1e-6);
    }

    #[test]
    fn test_energy_never_amplified() {
        // A half-gray diffuse sphere under a sky whose brightest channel
        // is 1.0: every path that hits it returns at most 0.5 per channel
        let mut world = HittableList::new();
        world.add(Box::new(Sphere::new(
            Vec3::new(0.0, 0.0, -2.0),
            1.0,
            Lambertian::new(Color::new(0.5, 0.5, 0.5)),
        )));

        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..50 {
            let color = ray_color(&ray, &world, 10, &mut rng);
            for channel in [color.x, color.y, color.z] {
                assert!((0.0..=0.5).contains(&channel), "channel {} out of range", channel);
            }
        }
    }

    #[test]
    fn test_zero_geometry_render_is_pure_background() {
        // 2x1 image, one sample, depth 1: the stream must hold exactly two
        // pixels, each the sky gradient of its generated ray
        let camera = Camera::new(
            CameraConfig::default()
                .with_image(2.0, 2)
                .with_quality(1, 1),
        );
        let world = HittableList::new();

        let mut rng = StdRng::seed_from_u64(7);
        let mut out = Vec::new();
        render_ppm(&camera, &world, &mut rng, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("P3"));
        assert_eq!(lines.next(), Some("2 1"));
        assert_eq!(lines.next(), Some("255"));

        // Replay the same rng stream to reproduce the sampled rays
        let mut replay = StdRng::seed_from_u64(7);
        for i in 0..2 {
            let ray = camera.get_ray(i, 0, &mut replay);
            let expected = color_to_rgb8(sky_at(ray.direction()));
            let line = lines.next().expect("missing pixel line");
            let parsed: Vec<u8> = line
                .split_whitespace()
                .map(|v| v.parse().unwrap())
                .collect();
            assert_eq!(parsed, expected);
        }
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_render_buffer_shape() {
        let camera = Camera::new(
            CameraConfig::default()
                .with_image(2.0, 4)
                .with_quality(1, 2),
        );
        let world = HittableList::new();
        let mut rng = StdRng::seed_from_u64(42);

        let image = render(&camera, &world, &mut rng);
        assert_eq!(image.width, 4);
        assert_eq!(image.height, 2);
        assert_eq!(image.pixels.len(), 8);
        assert_eq!(image.to_rgb8().len(), 24);

        // Empty scene: every pixel is somewhere on the sky gradient
        for pixel in &image.pixels {
            assert!(pixel.x >= 0.5 - 1e-5 && pixel.x <= 1.0 + 1e-5);
            assert!(pixel.z >= pixel.x - 1e-5);
        }
    }

    #[test]
    fn test_buffer_get_set_and_ppm() {
        let mut image = ImageBuffer::new(2, 2);
        image.set(1, 0, Color::ONE);
        assert_eq!(image.get(1, 0), Color::ONE);
        assert_eq!(image.get(0, 0), Color::ZERO);

        let mut out = Vec::new();
        image.write_ppm(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[..3], ["P3", "2 2", "255"]);
        assert_eq!(lines.len(), 3 + 4);
        assert_eq!(lines[4], "255 255 255");
    }

    #[test]
    fn test_save_png() {
        let mut image = ImageBuffer::new(3, 2);
        image.set(2, 1, Color::new(1.0, 0.0, 0.0));

        let path = std::env::temp_dir().join("lumen_render_test.png");
        image.save_png(&path).unwrap();
        assert!(path.exists());
        std::fs::remove_file(&path).ok();
    }
}

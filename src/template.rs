//! Template builder (C9): turns a source chart image plus user-chosen rectangles into a reusable
//! template artefact (a marked raster and a YAML descriptor).

use std::fs;
use std::path::Path;

use image::{Rgb, RgbImage};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::field;
use crate::raster::lrtb;
use crate::scale::{extract_scale, normalize_orientation, Scale};

/// A half-open pixel rectangle `(y0, y1, x0, x1)`, row-major to match the data model.
pub type Rect = (u32, u32, u32, u32);

/// The on-disk YAML descriptor: `{name, scale, cr, b}`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TemplateDescriptor {
    pub name: String,
    pub scale: Vec<[u8; 3]>,
    pub cr: [u32; 4],
    pub b: [u32; 4],
}

const MARKER: [i32; 3] = [125, 0, 0];

/// Builds a template from `image`, persisting `{name}_template.gif` and `{name}.yaml` under
/// `dir` (the caller has already resolved this to the `user` template directory).
///
/// `b` is the legend rectangle and `cr` a secondary rectangle (e.g. map legend text) that must
/// survive verbatim in the masked template raster.
pub fn build(image: &RgbImage, name: &str, b: Rect, cr: Rect, dir: &Path) -> Result<TemplateDescriptor> {
    let (width, height) = image.dimensions();
    let mut template_image = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));
    paste_rect(&mut template_image, image, b);
    paste_rect(&mut template_image, image, cr);

    let mut colours = extract_scale(image, b);
    if colours.is_empty() {
        return Err(Error::LegendExtraction(
            "no usable colour run found inside the legend rectangle".to_string(),
        ));
    }
    let mut scale = Scale::new(std::mem::take(&mut colours));
    normalize_orientation(&mut scale);

    let (l, r, t, bot) = lrtb(&template_image);
    let mut plt = field::gen(&template_image, &scale);
    plt = crate::condition::smooth(&plt, 2);
    for v in plt.iter_mut() {
        *v = v.floor();
    }

    let min = plt.iter().cloned().fold(f64::INFINITY, f64::min);
    for row in t..bot {
        for col in l..r {
            let value = *plt.get((row - t) as usize, (col - l) as usize);
            let px = template_image.get_pixel_mut(col, row);
            if value > min {
                px[0] = px[0].saturating_add(125);
            }
        }
    }

    let template_dir = dir.join(name);
    fs::create_dir_all(&template_dir)?;
    let gif_path = template_dir.join(format!("{name}_template.gif"));
    template_image.save(&gif_path)?;

    let descriptor = TemplateDescriptor {
        name: name.to_string(),
        scale: scale.colours,
        cr: [cr.0, cr.1, cr.2, cr.3],
        b: [b.0, b.1, b.2, b.3],
    };
    let yaml_path = template_dir.join(format!("{name}.yaml"));
    let yaml = serde_yaml::to_string(&descriptor)
        .map_err(|e| Error::InvalidTemplate { name: name.to_string(), reason: e.to_string() })?;
    fs::write(&yaml_path, yaml)?;

    Ok(descriptor)
}

fn paste_rect(dst: &mut RgbImage, src: &RgbImage, rect: Rect) {
    let (y0, y1, x0, x1) = rect;
    for y in y0..y1.min(dst.height()) {
        for x in x0..x1.min(dst.width()) {
            *dst.get_pixel_mut(x, y) = *src.get_pixel(x, y);
        }
    }
}

/// Loads a template's descriptor and raster from `dir/{name}/`.
pub fn load(dir: &Path, name: &str) -> Result<(TemplateDescriptor, RgbImage)> {
    let template_dir = dir.join(name);
    let yaml_path = template_dir.join(format!("{name}.yaml"));
    let gif_path = template_dir.join(format!("{name}_template.gif"));

    let yaml = fs::read_to_string(&yaml_path)?;
    let descriptor: TemplateDescriptor = serde_yaml::from_str(&yaml)
        .map_err(|e| Error::InvalidTemplate { name: name.to_string(), reason: e.to_string() })?;
    let image = image::open(&gif_path)?.to_rgb8();

    Ok((descriptor, image))
}

/// Whether a pixel is within `var` of the marker colour `[125, 0, 0]` on every channel.
pub fn is_marker(px: [u8; 3], var: i32) -> bool {
    (0..3).all(|c| (px[c] as i32 - MARKER[c]).abs() < var)
}

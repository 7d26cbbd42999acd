//! Top-level orchestration: wires the leaf components (C1-C3, C5-C11) into the encode/decode
//! operations the CLI exposes, plus template creation and listing.

use std::fs;
use std::path::Path;

use image::RgbImage;
use log::{debug, info};
use serde::Serialize;

use crate::condition::condition;
use crate::config::TemplateDirs;
use crate::dft;
use crate::error::{Error, Result};
use crate::field;
use crate::message::template_text;
use crate::message::{self, Header};
use crate::quantize;
use crate::reconstruct;
use crate::template::{self, Rect, TemplateDescriptor};
use crate::zigzag::dft_mapping;

/// Zig-zag shell count used for every message this crate produces (SPEC_FULL.md §4.3/§4.4).
const ZIGZAG_N: usize = 12;
/// Symmetric padding applied before conditioning and stripped again on decode.
const FIELD_PAD: usize = 50;

#[derive(Clone, Debug, Serialize)]
pub struct CompressResult {
    pub message_path: String,
    pub size_bytes: u64,
    pub template: String,
    pub dtg: String,
    pub max_coeff: i64,
}

#[derive(Clone, Debug, Serialize)]
pub struct DecompressResult {
    pub image_path: String,
    pub template: String,
    pub dtg: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct CreateTemplateResult {
    pub template_name: String,
    pub template_path: String,
    pub config_path: String,
    pub scale_colors: usize,
}

/// Compresses `image_path` against `template_name`'s colour scale, tagging the message with
/// `dtg`, and writes the result to `output_path`. Nothing is written to `output_path` if any
/// step fails (the message is assembled in memory first).
pub fn compress(
    dirs: &TemplateDirs,
    image_path: &Path,
    template_name: &str,
    dtg: &str,
    output_path: &Path,
) -> Result<CompressResult> {
    if !image_path.is_file() {
        return Err(Error::MissingInput(image_path.to_path_buf()));
    }
    let image = image::open(image_path)?.to_rgb8();

    let template_dir = dirs
        .locate(template_name)
        .ok_or_else(|| Error::MissingTemplate(template_name.to_string()))?;
    let (descriptor, _template_image) = load_descriptor(&template_dir, template_name)?;
    let scale = crate::scale::Scale::new(descriptor.scale.clone());

    debug!("generating scalar field for {template_name}");
    let raw_field = field::gen(&image, &scale);
    let conditioned = condition(&raw_field, FIELD_PAD);

    let min = conditioned.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = conditioned.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let max_coeff = (max - min - 1.0) as i64;

    let mut spectrum = dft::forward(&conditioned);
    dft::normalize_to_max(&mut spectrum, 1000.0);

    let coeffs = flatten_coefficients(&spectrum, ZIGZAG_N);
    let quantized: Vec<u32> = coeffs.iter().map(|&c| quantize::encode(c)).collect();

    let header = Header {
        height: conditioned.rows,
        width: conditioned.cols,
        n: ZIGZAG_N,
        max_coeff,
        dtg: dtg.to_string(),
        template: template_name.to_string(),
    };

    let (intro, outro) = template_text::load(&dirs.message_template_path())?;
    let message = message::build_message(&intro, &header, &quantized, &outro);

    write_atomically(output_path, message.as_bytes())?;
    let size_bytes = fs::metadata(output_path)?.len();

    info!("wrote compressed message to {}", output_path.display());
    Ok(CompressResult {
        message_path: output_path.display().to_string(),
        size_bytes,
        template: template_name.to_string(),
        dtg: dtg.to_string(),
        max_coeff,
    })
}

/// Reads a message from `message_path`, decodes it (optionally against an overriding template
/// name rather than the one embedded in the message), and writes the reconstructed chart image
/// to `output_path`.
pub fn decompress(
    dirs: &TemplateDirs,
    message_path: &Path,
    output_path: &Path,
    template_override: Option<&str>,
) -> Result<DecompressResult> {
    if !message_path.is_file() {
        return Err(Error::MissingInput(message_path.to_path_buf()));
    }
    let text = fs::read_to_string(message_path)?;
    let decoded = message::parse_message(&text)?;

    let template_name = template_override.unwrap_or(&decoded.header.template);
    let template_dir = dirs
        .locate(template_name)
        .ok_or_else(|| Error::MissingTemplate(template_name.to_string()))?;
    let (descriptor, template_image) = load_descriptor(&template_dir, template_name)?;
    let scale = crate::scale::Scale::new(descriptor.scale.clone());

    let addresses = dft_mapping(decoded.header.n);
    let mut spectrum =
        crate::raster::Grid::filled(decoded.header.height, decoded.header.width, 0f64);
    unflatten_coefficients(&decoded.coeffs, &addresses, &mut spectrum);

    let field = dft::decode(&spectrum, decoded.header.max_coeff as f64, FIELD_PAD);

    let restored = reconstruct::restore(&field, &template_image, &scale, &decoded.header.dtg);

    write_image_atomically(output_path, &restored)?;

    Ok(DecompressResult {
        image_path: output_path.display().to_string(),
        template: template_name.to_string(),
        dtg: decoded.header.dtg,
    })
}

/// Builds a new template from `image_path` and writes it into the `user` template directory.
pub fn create_template(
    dirs: &TemplateDirs,
    image_path: &Path,
    template_name: &str,
    b: Rect,
    cr: Rect,
) -> Result<CreateTemplateResult> {
    if !image_path.is_file() {
        return Err(Error::MissingInput(image_path.to_path_buf()));
    }
    let image = image::open(image_path)?.to_rgb8();

    let descriptor = template::build(&image, template_name, b, cr, &dirs.user)?;

    let template_dir = dirs.user.join(template_name);
    Ok(CreateTemplateResult {
        template_name: template_name.to_string(),
        template_path: template_dir
            .join(format!("{template_name}_template.gif"))
            .display()
            .to_string(),
        config_path: template_dir
            .join(format!("{template_name}.yaml"))
            .display()
            .to_string(),
        scale_colors: descriptor.scale.len(),
    })
}

pub fn list_templates(dirs: &TemplateDirs) -> Vec<String> {
    dirs.list()
}

fn load_descriptor(template_dir: &Path, name: &str) -> Result<(TemplateDescriptor, RgbImage)> {
    let parent = template_dir
        .parent()
        .ok_or_else(|| Error::MissingTemplate(name.to_string()))?;
    template::load(parent, name)
}

/// Reads coefficients out of `spectrum` (the packed forward-DFT output) in zig-zag shell order,
/// doubling each address across rows `i` and `H-i-1` per the real-DFT row symmetry.
fn flatten_coefficients(spectrum: &crate::raster::Grid<f64>, n: usize) -> Vec<f64> {
    let addresses = dft_mapping(n);
    let rows = spectrum.rows;
    let mut out = Vec::with_capacity(addresses.len() * 2);
    for &(i, j) in &addresses {
        for row in [i, rows - i - 1] {
            out.push(*spectrum.get(row, j));
        }
    }
    out
}

/// The inverse of [`flatten_coefficients`]: writes decoded coefficient codes back into `spectrum`
/// at their zig-zag addresses, leaving every untransmitted cell at its initial zero.
fn unflatten_coefficients(
    coeffs: &[u32],
    addresses: &[(usize, usize)],
    spectrum: &mut crate::raster::Grid<f64>,
) {
    let rows = spectrum.rows;
    let mut k = 0usize;
    for &(i, j) in addresses {
        for row in [i, rows - i - 1] {
            if k < coeffs.len() {
                *spectrum.get_mut(row, j) = quantize::decode(coeffs[k]);
            }
            k += 1;
        }
    }
}

fn write_atomically(path: &Path, contents: &[u8]) -> Result<()> {
    let tmp_path = sibling_tmp_path(path);
    fs::write(&tmp_path, contents)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

fn write_image_atomically(path: &Path, image: &RgbImage) -> Result<()> {
    let tmp_path = sibling_tmp_path(path);
    image.save(&tmp_path)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

fn sibling_tmp_path(path: &Path) -> std::path::PathBuf {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    path.with_file_name(format!(".{file_name}.tmp"))
}

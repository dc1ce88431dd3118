// Upload request parsing and validation

use crate::application::constants::{DEFAULT_FILE_NAME, MAX_COPIES, MAX_FILE_NAME_LEN, MIN_COPIES};
use crate::domain::{ColorMode, PaperSize, PrintMode, PrintType, UserId};
use crate::error::{AppError, Result};

/// Raw upload as received from the client. Text fields are unparsed.
#[derive(Debug, Clone, Default)]
pub struct UploadRequest {
    pub file_name: String,
    pub data: Vec<u8>,
    pub print_type: Option<String>,
    pub copies: Option<String>,
    pub print_mode: Option<String>,
    pub color_mode: Option<String>,
    pub paper_size: Option<String>,
    pub shop_id: Option<String>,
}

/// Upload parameters after validation, with defaults applied
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedUpload {
    pub file_name: String,
    pub print_type: PrintType,
    pub copies: u32,
    pub print_mode: PrintMode,
    pub color_mode: ColorMode,
    pub paper_size: PaperSize,
    pub shop_id: Option<UserId>,
}

/// Blank strings count as absent
fn field(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Last path component, truncated
fn clean_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or("").trim();
    if base.is_empty() {
        return DEFAULT_FILE_NAME.to_string();
    }
    base.chars().take(MAX_FILE_NAME_LEN).collect()
}

pub fn validate_request(req: &UploadRequest, max_upload_bytes: usize) -> Result<ValidatedUpload> {
    if req.data.is_empty() {
        return Err(AppError::Validation("file is empty".to_string()));
    }
    if req.data.len() > max_upload_bytes {
        return Err(AppError::Validation(format!(
            "file too large: {} bytes (max {})",
            req.data.len(),
            max_upload_bytes
        )));
    }

    let print_type = match field(&req.print_type) {
        Some(s) => s.parse::<PrintType>()?,
        None => PrintType::Private,
    };

    let copies = match field(&req.copies) {
        Some(s) => s
            .parse::<u32>()
            .map_err(|_| AppError::Validation(format!("copies must be an integer, got '{}'", s)))?,
        None => MIN_COPIES,
    };
    if !(MIN_COPIES..=MAX_COPIES).contains(&copies) {
        return Err(AppError::Validation(format!(
            "copies must be between {} and {}",
            MIN_COPIES, MAX_COPIES
        )));
    }

    let print_mode = match field(&req.print_mode) {
        Some(s) => s.parse::<PrintMode>()?,
        None => PrintMode::default(),
    };
    let color_mode = match field(&req.color_mode) {
        Some(s) => s.parse::<ColorMode>()?,
        None => ColorMode::default(),
    };
    let paper_size = match field(&req.paper_size) {
        Some(s) => PaperSize::parse(s)?,
        None => PaperSize::default(),
    };

    let shop_id = match field(&req.shop_id) {
        Some(s) => Some(s.parse::<UserId>().map_err(|_| {
            AppError::Validation(format!("shop_id must be an integer, got '{}'", s))
        })?),
        None => None,
    };
    match (print_type, shop_id) {
        (PrintType::Queue, None) => {
            return Err(AppError::Validation(
                "shop_id is required for queue prints".to_string(),
            ))
        }
        (PrintType::Private, Some(_)) => {
            return Err(AppError::Validation(
                "shop_id is only allowed for queue prints".to_string(),
            ))
        }
        _ => {}
    }

    Ok(ValidatedUpload {
        file_name: clean_file_name(&req.file_name),
        print_type,
        copies,
        print_mode,
        color_mode,
        paper_size,
        shop_id,
    })
}

use super::ApiError;
use crate::models::template::TemplateCategory;

pub fn validate_page(page: u64) -> Result<u64, ApiError> {
    if page == 0 {
        return Err(ApiError::validation(
            "Invalid page: 0. Pages are numbered from 1",
        ));
    }
    Ok(page)
}

pub fn validate_page_size(page_size: u64) -> Result<u64, ApiError> {
    const MAX_PAGE_SIZE: u64 = 100;
    const MIN_PAGE_SIZE: u64 = 1;

    if !(MIN_PAGE_SIZE..=MAX_PAGE_SIZE).contains(&page_size) {
        return Err(ApiError::validation(format!(
            "Invalid page size: {}. Page size must be between {} and {}",
            page_size, MIN_PAGE_SIZE, MAX_PAGE_SIZE
        )));
    }
    Ok(page_size)
}

pub fn validate_category(category: &str) -> Result<&str, ApiError> {
    if TemplateCategory::parse(category).is_none() {
        return Err(ApiError::validation(format!(
            "Invalid category: {}. Valid categories: {}",
            category,
            TemplateCategory::ALL
                .iter()
                .map(|c| c.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )));
    }
    Ok(category)
}

pub fn validate_record_id(id: i32) -> Result<i32, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid id: {}. ID must be a positive integer",
            id
        )));
    }
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_page() {
        assert!(validate_page(1).is_ok());
        assert!(validate_page(999).is_ok());
        assert!(validate_page(0).is_err());
    }

    #[test]
    fn test_validate_page_size() {
        assert!(validate_page_size(1).is_ok());
        assert!(validate_page_size(20).is_ok());
        assert!(validate_page_size(100).is_ok());
        assert!(validate_page_size(0).is_err());
        assert!(validate_page_size(101).is_err());
    }

    #[test]
    fn test_validate_category() {
        assert!(validate_category("code").is_ok());
        assert!(validate_category("research").is_ok());
        assert!(validate_category("marketing").is_err());
        assert!(validate_category("").is_err());
    }

    #[test]
    fn test_validate_record_id() {
        assert!(validate_record_id(1).is_ok());
        assert!(validate_record_id(0).is_err());
        assert!(validate_record_id(-5).is_err());
    }
}

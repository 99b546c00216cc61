use super::ApiError;

pub fn validate_order_id(id: i32) -> Result<i32, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid order ID: {}. ID must be a positive integer",
            id
        )));
    }
    Ok(id)
}

pub fn validate_item_id(id: i32) -> Result<i32, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid order item ID: {}. ID must be a positive integer",
            id
        )));
    }
    Ok(id)
}

pub fn validate_search_term(term: &str) -> Result<&str, ApiError> {
    let trimmed = term.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("Search term cannot be empty"));
    }
    Ok(trimmed)
}

use anyhow::{anyhow, Result};

/// Validation utilities for input sanitization and edge case handling
#[derive(Debug, Copy, Clone)]
pub struct InputValidator;

impl InputValidator {
    /// Validate a box or item display name
    pub fn validate_name(name: &str) -> Result<()> {
        if name.trim().is_empty() {
            return Err(anyhow!("Name cannot be empty"));
        }

        if name.len() > 100 {
            return Err(anyhow!("Name too long (max 100 characters)"));
        }

        // Check for potentially dangerous characters
        if name.contains('\0') || name.contains('\r') || name.contains('\n') {
            return Err(anyhow!("Name contains invalid characters"));
        }

        Ok(())
    }

    /// Validate phone number format
    pub fn validate_phone(phone: &str) -> Result<()> {
        if phone.trim().is_empty() {
            return Err(anyhow!("Phone number cannot be empty"));
        }

        // Remove common formatting characters
        let cleaned = phone
            .chars()
            .filter(|c| {
                c.is_ascii_digit() || *c == '+' || *c == '-' || *c == '(' || *c == ')' || *c == ' '
            })
            .collect::<String>();

        // Check if it contains only digits and + at the start
        let digits_only = cleaned.chars().filter(char::is_ascii_digit).count();

        if !(7..=15).contains(&digits_only) {
            return Err(anyhow!("Phone number must be between 7 and 15 digits"));
        }

        Ok(())
    }

    /// Validate an item quantity
    pub fn validate_quantity(quantity: u32) -> Result<()> {
        if quantity == 0 {
            return Err(anyhow!("Quantity must be at least 1"));
        }

        if quantity > 10_000 {
            return Err(anyhow!("Quantity too large (max 10,000)"));
        }

        Ok(())
    }

    /// Validate an item weight in pounds
    pub fn validate_weight(weight: f64) -> Result<()> {
        if weight < 0.0 {
            return Err(anyhow!("Weight cannot be negative"));
        }

        if weight > 20_000.0 {
            return Err(anyhow!("Weight too large (max 20,000 lbs)"));
        }

        Ok(())
    }

    /// Validate a claim payout amount in dollars
    pub fn validate_payout(amount: f64) -> Result<()> {
        if amount <= 0.0 {
            return Err(anyhow!("Payout amount must be positive"));
        }

        if amount > 1_000_000.0 {
            return Err(anyhow!("Payout amount too large (max $1,000,000)"));
        }

        Ok(())
    }

    /// Validate a protection price in dollars
    pub fn validate_protection_price(price: f64) -> Result<()> {
        if price <= 0.0 {
            return Err(anyhow!("Protection price must be positive"));
        }

        if price > 100_000.0 {
            return Err(anyhow!("Protection price too large (max $100,000)"));
        }

        Ok(())
    }

    /// Validate a free-text description
    pub fn validate_description(description: &str) -> Result<()> {
        if description.len() > 2000 {
            return Err(anyhow!("Description too long (max 2000 characters)"));
        }

        Ok(())
    }

    /// Sanitize text input
    #[must_use]
    pub fn sanitize_text(text: &str) -> String {
        text.chars()
            .filter(|c| !c.is_control() || *c == '\n' || *c == '\t' || *c == '\r')
            .collect::<String>()
            .trim()
            .to_string()
    }
}

/// Endpoint and token constants for TheCocktailDB.
///
/// The search endpoint indexes drinks by the first character of their name,
/// so the full catalog is the union of one query per letter and digit.

pub const DEFAULT_API_BASE_URL: &str = "https://www.thecocktaildb.com/api/json/v1/1";
pub const SEARCH_BY_FIRST_CHAR_PATH: &str = "search.php";
pub const RANDOM_PATH: &str = "random.php";

pub const LETTERS: &str = "abcdefghijklmnopqrstuvwxyz";
pub const DIGITS: &str = "0123456789";

/// Number of `strIngredientN` / `strMeasureN` slots in a drink record
pub const INGREDIENT_SLOTS: usize = 15;

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 15;
pub const DEFAULT_CONFIG_PATH: &str = "drinkify.toml";

// User-facing messages
pub const CATALOG_FAILURE_MESSAGE: &str = "Could not fetch drinks";
pub const RANDOM_FAILURE_MESSAGE: &str = "Failed to fetch a random drink. Please try again.";
pub const EMPTY_RESULTS_MESSAGE: &str = "No results. Try another search.";
pub const NO_INGREDIENTS_MESSAGE: &str = "No ingredients found.";

/// All partition tokens: the lowercase letters followed by the digits
pub fn partition_tokens() -> Vec<char> {
    LETTERS.chars().chain(DIGITS.chars()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_tokens_cover_letters_then_digits() {
        let tokens = partition_tokens();
        assert_eq!(tokens.len(), 36);
        assert_eq!(tokens.first(), Some(&'a'));
        assert_eq!(tokens[25], 'z');
        assert_eq!(tokens[26], '0');
        assert_eq!(tokens.last(), Some(&'9'));
    }
}

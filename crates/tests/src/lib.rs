
#[cfg(test)]
mod oauth_tests;

use heck::ToKebabCase;

/// URL slug for a bootcamp name, e.g. `Devworks Bootcamp` → `devworks-bootcamp`.
pub fn slugify(name: &str) -> String {
    name.to_kebab_case()
}

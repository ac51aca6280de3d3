pub const GITIGNORE: &str = "out/\n.env\n";

pub const ENV_EXAMPLE: &str = "OPENAI_API_KEY=\nANTHROPIC_API_KEY=\nGOOGLE_API_KEY=\n";

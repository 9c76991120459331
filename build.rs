use std::process::Command;

fn main() {
    // Only rebuild CSS when template or CSS files change
    println!("cargo:rerun-if-changed=assets/css/input.css");
    println!("cargo:rerun-if-changed=templates/");

    // Try to run Tailwind CSS standalone CLI
    let status = Command::new("tailwindcss")
        .args([
            "-i",
            "assets/css/input.css",
            "-o",
            "assets/css/output.css",
            "--minify",
        ])
        .status();

    match status {
        Ok(s) if s.success() => {
            println!("cargo:warning=Tailwind CSS compiled successfully");
        }
        _ => {
            // Tailwind CLI not available — write a plain-CSS fallback
            println!("cargo:warning=Tailwind CLI not found, using fallback CSS");
            let fallback = r#"*, *::before, *::after { box-sizing: border-box; margin: 0; padding: 0; }
body { font-family: system-ui, -apple-system, sans-serif; line-height: 1.6; color: #1c1917; background: #fafaf9; -webkit-font-smoothing: antialiased; display: flex; flex-direction: column; min-height: 100vh; }
.container { max-width: 48rem; margin: 0 auto; padding: 0 1rem; width: 100%; }
main.container { flex: 1; padding-top: 1.5rem; padding-bottom: 3rem; }
a { color: inherit; text-decoration: none; }
a:hover { opacity: 0.8; }
h1 { font-size: 1.75rem; margin-bottom: 0.5rem; }
h2 { font-size: 1.25rem; margin-bottom: 0.25rem; }
.site-header { background: #fff; border-bottom: 1px solid #e7e5e4; }
.header-inner { display: flex; align-items: center; gap: 1rem; padding: 0.75rem 1rem; }
.brand { font-weight: 700; font-size: 1.25rem; }
.search-form { flex: 1; }
.search-form input { width: 100%; padding: 0.4rem 0.75rem; border: 1px solid #d6d3d1; border-radius: 0.5rem; }
.nav-links { display: flex; gap: 0.75rem; font-size: 0.875rem; align-items: center; }
.site-footer { border-top: 1px solid #e7e5e4; padding: 1rem 0; font-size: 0.75rem; color: #78716c; text-align: center; }
.card { background: #fff; border-radius: 0.75rem; border: 1px solid #e7e5e4; padding: 1.5rem; box-shadow: 0 1px 2px 0 rgb(0 0 0 / 0.05); margin-bottom: 1rem; }
.hero { margin-bottom: 1.5rem; }
.hero-stats { color: #78716c; font-size: 0.875rem; }
.popular-tags { margin-bottom: 1.5rem; display: flex; flex-wrap: wrap; gap: 0.5rem; }
.tag { display: inline-block; background: #f5f5f4; border-radius: 9999px; padding: 0.15rem 0.7rem; font-size: 0.8rem; margin-right: 0.25rem; }
.tag:hover { background: #e7e5e4; }
.post-title { margin-bottom: 0.25rem; }
.post-meta { color: #78716c; font-size: 0.8rem; margin-bottom: 0.5rem; }
.post-excerpt { margin-bottom: 0.5rem; }
.post-stats { display: flex; gap: 0.75rem; color: #78716c; font-size: 0.85rem; }
.post-image { max-width: 100%; border-radius: 0.5rem; margin-bottom: 0.75rem; }
.post-image-full { max-width: 100%; border-radius: 0.5rem; margin: 0.75rem 0; }
.post-content { white-space: normal; margin: 1rem 0; }
.empty { color: #78716c; text-align: center; padding: 2rem 0; }
.pagination { display: flex; gap: 1rem; justify-content: center; align-items: center; margin-top: 1.5rem; font-size: 0.875rem; }
.btn { display: inline-flex; align-items: center; justify-content: center; padding: 0.5rem 1rem; border-radius: 0.5rem; font-size: 0.875rem; font-weight: 500; transition: all 0.15s; cursor: pointer; text-decoration: none; }
.btn-primary { background: #1c1917; color: #fff; border: none; }
.btn-primary:hover { background: #44403c; }
.btn-secondary { background: #fff; color: #1c1917; border: 1px solid #d6d3d1; }
.btn-secondary:hover { background: #f5f5f4; }
.btn-danger { background: #fff; color: #b91c1c; border: 1px solid #fca5a5; }
.btn-danger:hover { background: #fef2f2; }
.btn-active { background: #1c1917; color: #fff; border: 1px solid #1c1917; }
.btn-small { padding: 0.25rem 0.6rem; font-size: 0.75rem; }
.stacked-form { display: flex; flex-direction: column; gap: 0.75rem; }
.stacked-form label { display: flex; flex-direction: column; gap: 0.25rem; font-size: 0.875rem; font-weight: 500; }
.stacked-form input, .stacked-form textarea { padding: 0.5rem 0.75rem; border: 1px solid #d6d3d1; border-radius: 0.5rem; font: inherit; }
.form-errors { background: #fef2f2; border: 1px solid #fca5a5; color: #b91c1c; border-radius: 0.5rem; padding: 0.75rem 1rem 0.75rem 2rem; margin-bottom: 1rem; font-size: 0.875rem; }
.flash { background: #f0fdf4; border: 1px solid #86efac; color: #15803d; border-radius: 0.5rem; padding: 0.75rem 1rem; margin-bottom: 1rem; font-size: 0.875rem; }
.auth-card { max-width: 28rem; margin: 2rem auto; }
.form-card { max-width: 40rem; margin: 0 auto; }
.auth-switch { margin-top: 1rem; font-size: 0.875rem; color: #78716c; }
.search-form-large { display: flex; gap: 0.5rem; margin: 0.75rem 0; }
.search-form-large input { flex: 1; padding: 0.5rem 0.75rem; border: 1px solid #d6d3d1; border-radius: 0.5rem; }
.reaction-bar { display: flex; gap: 0.5rem; margin: 1rem 0; align-items: center; }
.owner-actions { display: flex; gap: 0.5rem; margin-top: 0.75rem; }
.comments { margin-top: 2rem; }
.comment-form { margin: 1rem 0; }
.comment { padding: 1rem; }
.profile-header h1 { margin-bottom: 0; }
.profile-stats { display: flex; gap: 1rem; color: #78716c; font-size: 0.875rem; margin: 0.5rem 0; flex-wrap: wrap; }
.tabs { display: flex; gap: 1rem; border-bottom: 1px solid #e7e5e4; margin-bottom: 1rem; font-size: 0.9rem; }
.tabs a { padding: 0.5rem 0.25rem; border-bottom: 2px solid transparent; }
.tab-active { border-bottom-color: #1c1917 !important; font-weight: 600; }
.stat-grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(10rem, 1fr)); gap: 1rem; margin: 1rem 0; }
.stat-card { text-align: center; }
.stat-number { font-size: 2rem; font-weight: 700; }
.admin-links { display: flex; gap: 0.5rem; margin-top: 1rem; }
.admin-table { width: 100%; border-collapse: collapse; font-size: 0.875rem; }
.admin-table th, .admin-table td { text-align: left; padding: 0.5rem 0.75rem; border-bottom: 1px solid #e7e5e4; }
.mono { font-family: ui-monospace, monospace; font-size: 0.75rem; color: #78716c; }
"#;
            std::fs::create_dir_all("assets/css").ok();
            std::fs::write("assets/css/output.css", fallback).ok();
        }
    }
}

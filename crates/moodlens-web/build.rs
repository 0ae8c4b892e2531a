//! 빌드 스크립트: 임베드할 클라이언트 자산 확인
//!
//! `frontend/`의 파일은 rust-embed로 바이너리에 포함된다.

use std::path::Path;

fn main() {
    println!("cargo:rerun-if-changed=frontend");

    for asset in ["index.html", "app.js", "style.css"] {
        let path = Path::new("frontend").join(asset);
        if !path.exists() {
            println!("cargo:warning=클라이언트 자산 누락: {}", path.display());
        }
    }
}

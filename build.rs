// without mkl, the eigen solver of ndarray-linalg goes through the system lapacke
#[cfg(not(feature="intel-mkl-static"))]
fn main() {
    println!("cargo:rustc-link-lib=lapacke");
}

#[cfg(feature="intel-mkl-static")]
fn main() {
}

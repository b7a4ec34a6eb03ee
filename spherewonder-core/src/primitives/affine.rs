//! Affine complex arithmetic: ordinary complex pairs, no renormalization.
//!
//! Mirrors the `_c*` GLSL primitives and the `vec2` overloads of the
//! transcendental functions.

use crate::complex::Complex;

#[inline]
pub fn add(a: &Complex, b: &Complex) -> Complex {
    a.add(b)
}

#[inline]
pub fn sub(a: &Complex, b: &Complex) -> Complex {
    a.sub(b)
}

#[inline]
pub fn opp(a: &Complex) -> Complex {
    a.neg()
}

#[inline]
pub fn mul(a: &Complex, b: &Complex) -> Complex {
    a.mul(b)
}

#[inline]
pub fn div(a: &Complex, b: &Complex) -> Complex {
    a.div(b)
}

/// `a^b` on the principal branch. Only the real part of `b` is used.
pub fn pow(a: &Complex, b: &Complex) -> Complex {
    let r = a.norm().powf(b.re);
    let theta = a.arg() * b.re;
    Complex::new(r * theta.cos(), r * theta.sin())
}

/// Principal square root.
pub fn sqrt(a: &Complex) -> Complex {
    let r = a.norm().sqrt();
    let theta = a.arg() / 2.0;
    Complex::new(r * theta.cos(), r * theta.sin())
}

pub fn exp(a: &Complex) -> Complex {
    let r = a.re.exp();
    Complex::new(r * a.im.cos(), r * a.im.sin())
}

/// Principal logarithm.
pub fn log(a: &Complex) -> Complex {
    Complex::new(a.norm().ln(), a.arg())
}

pub fn sin(a: &Complex) -> Complex {
    Complex::new(a.re.sin() * a.im.cosh(), a.re.cos() * a.im.sinh())
}

pub fn cos(a: &Complex) -> Complex {
    Complex::new(a.re.cos() * a.im.cosh(), -a.re.sin() * a.im.sinh())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: Complex, b: Complex) {
        assert!(
            (a.re - b.re).abs() < 1e-12 && (a.im - b.im).abs() < 1e-12,
            "{:?} != {:?}",
            a,
            b
        );
    }

    #[test]
    fn pow_with_integer_exponent_matches_repeated_mul() {
        let z = Complex::new(0.6, -1.1);
        let cubed = mul(&mul(&z, &z), &z);
        assert_close(pow(&z, &Complex::real(3.0)), cubed);
    }

    #[test]
    fn sqrt_squares_back() {
        let z = Complex::new(-3.0, 4.0);
        let root = sqrt(&z);
        assert_close(mul(&root, &root), z);
        // principal branch has non-negative real part
        assert!(root.re >= 0.0);
    }

    #[test]
    fn exp_of_i_pi_is_minus_one() {
        let z = exp(&Complex::new(0.0, std::f64::consts::PI));
        assert_close(z, Complex::real(-1.0));
    }

    #[test]
    fn log_inverts_exp() {
        let z = Complex::new(0.5, 1.2);
        assert_close(log(&exp(&z)), z);
    }

    #[test]
    fn sin_cos_pythagorean_identity() {
        let z = Complex::new(0.3, 0.7);
        let s = sin(&z);
        let c = cos(&z);
        assert_close(add(&mul(&s, &s), &mul(&c, &c)), Complex::ONE);
    }

    #[test]
    fn opp_and_sub_agree() {
        let a = Complex::new(1.0, 2.0);
        let b = Complex::new(-0.5, 4.0);
        assert_close(sub(&a, &b), add(&a, &opp(&b)));
    }
}

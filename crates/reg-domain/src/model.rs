// model.rs
//! Modelo Elastic Net ajustado y su formato binario.
//!
//! Formato (little-endian):
//!
//! | campo | bytes |
//! |---|---|
//! | magic `RGFM` | 4 |
//! | versión (u16) | 2 |
//! | n_features (u32) | 4 |
//! | coeficientes (f64) | 8 · n_features |
//! | intercepto, alpha, l1_ratio (f64) | 24 |
//! | iteraciones (u32) | 4 |
//! | convergió (u8) | 1 |
//! | sha256 de todo lo anterior | 32 |

use ndarray::Array1;
use reg_engine::{fit_elastic_net, predict, r2_score, ElasticNetConfig};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{Dataset, DomainError, ElasticNetParams};

const MAGIC: &[u8; 4] = b"RGFM";
const FORMAT_VERSION: u16 = 1;
const CHECKSUM_LEN: usize = 32;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElasticNetModel {
    pub coef: Vec<f64>,
    pub intercept: f64,
    pub params: ElasticNetParams,
    pub n_iter: u32,
    pub converged: bool,
}

impl ElasticNetModel {
    /// Ajusta el modelo sobre `train`.
    pub fn fit(train: &Dataset, params: &ElasticNetParams) -> Result<Self, DomainError> {
        params.validate()?;
        let cfg = ElasticNetConfig::new(params.alpha, params.l1_ratio);
        let fit = fit_elastic_net(train.features(), train.target(), &cfg)?;
        Ok(Self { coef: fit.coef.to_vec(),
                  intercept: fit.intercept,
                  params: *params,
                  n_iter: u32::try_from(fit.n_iter).unwrap_or(u32::MAX),
                  converged: fit.converged })
    }

    pub fn predict(&self, data: &Dataset) -> Result<Array1<f64>, DomainError> {
        Ok(predict(data.features(), &Array1::from_vec(self.coef.clone()), self.intercept)?)
    }

    /// R² sobre `data`.
    pub fn score(&self, data: &Dataset) -> Result<f64, DomainError> {
        let pred = self.predict(data)?;
        Ok(r2_score(data.target(), &pred)?)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(4 + 2 + 4 + 8 * self.coef.len() + 24 + 5 + CHECKSUM_LEN);
        out.extend_from_slice(MAGIC);
        out.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
        out.extend_from_slice(&(self.coef.len() as u32).to_le_bytes());
        for c in &self.coef {
            out.extend_from_slice(&c.to_le_bytes());
        }
        for v in [self.intercept, self.params.alpha, self.params.l1_ratio] {
            out.extend_from_slice(&v.to_le_bytes());
        }
        out.extend_from_slice(&self.n_iter.to_le_bytes());
        out.push(u8::from(self.converged));
        let digest = Sha256::digest(&out);
        out.extend_from_slice(&digest);
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DomainError> {
        let bad = |m: &str| DomainError::ModelFormatError(m.to_string());
        if bytes.len() < 4 + 2 + 4 + 24 + 5 + CHECKSUM_LEN {
            return Err(bad("archivo truncado"));
        }
        let (body, checksum) = bytes.split_at(bytes.len() - CHECKSUM_LEN);
        if Sha256::digest(body).as_slice() != checksum {
            return Err(bad("checksum inválido"));
        }
        let mut r = Reader { buf: body, pos: 0 };
        if r.take(4)? != MAGIC {
            return Err(bad("magic desconocido"));
        }
        let version = u16::from_le_bytes(r.array()?);
        if version != FORMAT_VERSION {
            return Err(DomainError::ModelFormatError(format!("versión {version} no soportada")));
        }
        let n = u32::from_le_bytes(r.array()?) as usize;
        if body.len() != 4 + 2 + 4 + 8 * n + 24 + 5 {
            return Err(bad("longitud inconsistente con n_features"));
        }
        let mut coef = Vec::with_capacity(n);
        for _ in 0..n {
            coef.push(f64::from_le_bytes(r.array()?));
        }
        let intercept = f64::from_le_bytes(r.array()?);
        let alpha = f64::from_le_bytes(r.array()?);
        let l1_ratio = f64::from_le_bytes(r.array()?);
        let n_iter = u32::from_le_bytes(r.array()?);
        let converged = r.take(1)?[0] != 0;
        Ok(Self { coef,
                  intercept,
                  params: ElasticNetParams { alpha, l1_ratio },
                  n_iter,
                  converged })
    }
}

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], DomainError> {
        let end = self.pos + n;
        let s = self.buf
                    .get(self.pos..end)
                    .ok_or_else(|| DomainError::ModelFormatError("archivo truncado".into()))?;
        self.pos = end;
        Ok(s)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], DomainError> {
        let s = self.take(N)?;
        let mut a = [0u8; N];
        a.copy_from_slice(s);
        Ok(a)
    }
}

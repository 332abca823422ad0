use alloy::primitives::Address;

use crate::models::{Asset, EntryPoint, SwapError, SwapRoute};

/// Maps an input/output asset pair onto a router entry point and token path.
///
/// V2 routers never see the native currency itself: the native leg of a path is the
/// placeholder address the router expects there, usually the wrapped native token.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathResolver {
    native_placeholder: Option<Address>,
}

impl PathResolver {
    pub fn new(native_placeholder: Option<Address>) -> Self {
        Self { native_placeholder }
    }

    pub fn resolve(&self, input: &Asset, output: &Asset) -> Result<SwapRoute, SwapError> {
        match (input, output) {
            (Asset::Native, Asset::Native) => Err(SwapError::InvalidIntent(
                "native to native is not a swap".to_string(),
            )),
            (Asset::Native, Asset::Token { address, .. }) => Ok(SwapRoute {
                entry_point: EntryPoint::NativeToToken,
                path: vec![self.placeholder()?, *address],
            }),
            (Asset::Token { address, .. }, Asset::Native) => Ok(SwapRoute {
                entry_point: EntryPoint::TokenToNative,
                path: vec![*address, self.placeholder()?],
            }),
            (Asset::Token { address: from, .. }, Asset::Token { address: to, .. }) => {
                if from == to {
                    return Err(SwapError::InvalidIntent(format!(
                        "input and output are the same token {from}"
                    )));
                }
                Ok(SwapRoute {
                    entry_point: EntryPoint::TokenToToken,
                    path: vec![*from, *to],
                })
            }
        }
    }

    fn placeholder(&self) -> Result<Address, SwapError> {
        self.native_placeholder.ok_or_else(|| {
            SwapError::InvalidIntent(
                "native leg requires NATIVE_PLACEHOLDER_ADDRESS to be configured".to_string(),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::FailureKind,
        utils::mocks::{token_in, token_out, wrapped_native},
    };

    fn resolver() -> PathResolver {
        PathResolver::new(Some(wrapped_native()))
    }

    #[test]
    fn test_native_to_token() {
        let route = resolver()
            .resolve(&Asset::Native, &Asset::token(token_out()))
            .unwrap();
        assert_eq!(route.entry_point, EntryPoint::NativeToToken);
        assert_eq!(route.path, vec![wrapped_native(), token_out()]);
        assert!(route.entry_point.is_payable());
    }

    #[test]
    fn test_token_to_native() {
        let route = resolver()
            .resolve(&Asset::token(token_in()), &Asset::Native)
            .unwrap();
        assert_eq!(route.entry_point, EntryPoint::TokenToNative);
        assert_eq!(route.path, vec![token_in(), wrapped_native()]);
        assert!(!route.entry_point.is_payable());
    }

    #[test]
    fn test_token_to_token() {
        let route = resolver()
            .resolve(
                &Asset::token_with_decimals(token_in(), 6),
                &Asset::token(token_out()),
            )
            .unwrap();
        assert_eq!(route.entry_point, EntryPoint::TokenToToken);
        assert_eq!(route.path, vec![token_in(), token_out()]);
    }

    #[test]
    fn test_token_to_token_ignores_missing_placeholder() {
        let route = PathResolver::default()
            .resolve(&Asset::token(token_in()), &Asset::token(token_out()))
            .unwrap();
        assert_eq!(route.path.len(), 2);
    }

    #[test]
    fn test_invalid_pairs() {
        let same = Asset::token(token_in());
        let cases = [
            (resolver(), Asset::Native, Asset::Native),
            (resolver(), same, same),
            (PathResolver::default(), Asset::Native, Asset::token(token_out())),
            (PathResolver::default(), Asset::token(token_in()), Asset::Native),
        ];

        for (resolver, input, output) in cases {
            let err = resolver.resolve(&input, &output).unwrap_err();
            assert_eq!(err.kind(), FailureKind::InvalidIntent, "{input} -> {output}");
        }
    }
}

use alloy::sol;

sol! {
    /// Price oracle: both calls return 18-decimal fixed point values.
    #[sol(rpc)]
    interface IDexLens {
        function getTokenPriceUSD(address token) external view returns (uint256);
        function getTokenPriceNative(address token) external view returns (uint256);
    }
}

use alloy::sol;

sol! {
    #[sol(rpc)]
    interface ILBFactory {
        function getFeeRecipient() external view returns (address);
        function getFlashLoanFee() external view returns (uint256);
    }
}

/// 检查当前进程是否具有管理员/root 权限
///
/// 只用来决定是否打印警告，出错时返回 false。
pub fn has_elevated_privileges() -> bool {
    #[cfg(unix)]
    {
        nix::unistd::geteuid().is_root()
    }

    #[cfg(windows)]
    {
        // SAFETY: IsUserAnAdmin 没有参数，也不持有任何资源
        unsafe { windows::Win32::UI::Shell::IsUserAnAdmin().as_bool() }
    }

    #[cfg(not(any(unix, windows)))]
    {
        false
    }
}
